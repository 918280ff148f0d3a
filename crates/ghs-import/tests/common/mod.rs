//! Fakes shared by the workflow tests.
//!
//! `FakeGrass` keeps a set of maps per session and answers the handful of
//! modules the importer parses output from. `FakeFetch` serves canned bodies
//! from memory.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use ghs_grass::{write_gisrc, CommandRunner, Grass, GrassError, GrassResult, ModuleCall, Workspace};
use ghs_import::ImportConfig;
use ghs_tiles::{Fetch, Sources, TileError, TileGrid};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const LOCATION: &str = "nc_spm";
pub const MAPSET: &str = "user1";
pub const RUN_ID: &str = "77";

pub const S1_URL: &str = "http://ghs.test/s1/GHS_S1.zip";
pub const S1_PAYLOAD: &str = "GHS_S1/V1-0/GHS_S1.vrt";
pub const SCHEMA_URL: &str = "http://ghs.test/docs/S2_tile_schema.zip";
pub const TILES_URL: &str = "http://ghs.test/tiles";

const REGION: &str = "n=228500\ns=215000\nw=630000\ne=645000\n\
nsres=10\newres=10\nrows=1350\ncols=1500\ncells=2025000\n";

// ============================================================================
// GRASS
// ============================================================================

/// Records module calls and simulates the maps they create.
pub struct FakeGrass {
    pub gisdbase: PathBuf,
    /// `(gisrc, call)` in call order.
    pub calls: RefCell<Vec<(PathBuf, String)>>,
    /// `(gisrc, map name)` of existing maps.
    pub maps: RefCell<BTreeSet<(PathBuf, String)>>,
    pub missing: RefCell<Vec<String>>,
    pub fail: RefCell<Option<String>>,
    /// Content of the last file imported with `v.in.ogr`.
    pub imported_index: RefCell<Option<String>>,
    pub s2_urls: Vec<String>,
    pub built_tiles: Vec<String>,
}

impl FakeGrass {
    fn is_temp(workspace: &Workspace) -> bool {
        fs::read_to_string(workspace.gisrc())
            .map(|text| text.contains("LOCATION_NAME: temp_import_location"))
            .unwrap_or(false)
    }

    fn table(header: &str, values: &[String]) -> String {
        let mut out = format!("cat|{}\n", header);
        for (idx, value) in values.iter().enumerate() {
            out.push_str(&format!("{}|{}\n", idx + 1, value));
        }
        out
    }
}

impl CommandRunner for FakeGrass {
    fn run(&self, workspace: &Workspace, call: &ModuleCall) -> GrassResult<String> {
        let gisrc = workspace.gisrc().to_path_buf();
        self.calls.borrow_mut().push((gisrc.clone(), call.to_string()));

        if self.fail.borrow().as_deref() == Some(call.name()) {
            return Err(GrassError::ModuleFailed {
                module: call.name().to_string(),
                code: Some(1),
                stderr: "ERROR: simulated failure".to_string(),
            });
        }

        let temp = Self::is_temp(workspace);
        match call.name() {
            "g.region" => Ok(REGION.to_string()),
            "g.gisenv" => Ok(format!(
                "GISDBASE={};\nLOCATION_NAME={};\nMAPSET={};\n",
                self.gisdbase.display(),
                LOCATION,
                MAPSET
            )),
            "g.proj" if call.has_flag('c') => {
                let location = call.get("location").unwrap_or_default();
                fs::create_dir_all(self.gisdbase.join(location).join("PERMANENT")).map_err(GrassError::Io)?;
                Ok(String::new())
            }
            "g.proj" if temp => Ok("name=WGS 84 / Pseudo-Mercator\nsrid=EPSG:3857\n".to_string()),
            "g.proj" => Ok("name=NAD83(HARN) / North Carolina\nsrid=EPSG:3358\n".to_string()),
            "g.findfile" => {
                let name = call.get("file").unwrap_or_default().to_string();
                if self.maps.borrow().contains(&(gisrc, name.clone())) {
                    Ok(format!("name='{}'\nmapset='{}'\nfile='/db/{}'\n", name, MAPSET, name))
                } else {
                    Err(GrassError::ModuleFailed {
                        module: "g.findfile".to_string(),
                        code: Some(1),
                        stderr: String::new(),
                    })
                }
            }
            "g.remove" => {
                let name = call.get("name").unwrap_or_default().to_string();
                self.maps.borrow_mut().remove(&(gisrc, name));
                Ok(String::new())
            }
            "v.in.ogr" => {
                let input = call.get("input").unwrap_or_default();
                *self.imported_index.borrow_mut() = Some(fs::read_to_string(input).map_err(GrassError::Io)?);
                if let Some(output) = call.get("output") {
                    self.maps.borrow_mut().insert((gisrc, output.to_string()));
                }
                Ok(String::new())
            }
            "v.db.select" if temp => Ok(Self::table("tile", &self.built_tiles)),
            "v.db.select" => Ok(Self::table("location", &self.s2_urls)),
            _ => {
                if let Some(output) = call.get("output") {
                    self.maps.borrow_mut().insert((gisrc, output.to_string()));
                }
                Ok(String::new())
            }
        }
    }

    fn is_available(&self, _workspace: &Workspace, module: &str) -> bool {
        !self.missing.borrow().iter().any(|m| m == module)
    }
}

// ============================================================================
// Downloads
// ============================================================================

/// Serves canned bodies and records requested URLs.
#[derive(Default)]
pub struct FakeFetch {
    pub bodies: RefCell<HashMap<String, Vec<u8>>>,
    pub requested: RefCell<Vec<String>>,
}

impl Fetch for FakeFetch {
    fn fetch(&self, url: &str, dest: &Path) -> ghs_tiles::Result<u64> {
        self.requested.borrow_mut().push(url.to_string());
        let bodies = self.bodies.borrow();
        let body = bodies
            .get(url)
            .ok_or_else(|| TileError::NotFound { url: url.to_string() })?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, body)?;
        Ok(body.len() as u64)
    }
}

/// Zip archive holding `entries`.
pub fn zip_bytes(entries: &[&str]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for name in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(name.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

// ============================================================================
// Fixture
// ============================================================================

/// A GRASS database in a temporary directory with tiles to download.
pub struct Fixture {
    pub temp: TempDir,
    pub workspace: Workspace,
    pub grass: Grass<FakeGrass>,
    pub fetch: FakeFetch,
    pub config: ImportConfig,
}

pub fn s2_tile_url(idx: usize) -> String {
    format!("http://ghs.test/s2/S2_tile_{}.tif", idx)
}

pub fn built_tile_name(idx: usize) -> String {
    TileGrid::default().tile_name(10, 13 + idx as u32)
}

impl Fixture {
    /// Fixture whose region overlaps `s2_tiles` GHS-BUILT-S2 tiles and
    /// `built_tiles` GHS-BUILT tiles.
    pub fn new(s2_tiles: usize, built_tiles: usize) -> Self {
        let temp = TempDir::new().unwrap();
        let gisdbase = temp.path().join("grassdata");
        fs::create_dir_all(gisdbase.join(LOCATION).join(MAPSET)).unwrap();
        let workspace = write_gisrc(&temp.path().join("gisrc"), &gisdbase, LOCATION, MAPSET).unwrap();

        let s2_urls: Vec<String> = (0..s2_tiles).map(s2_tile_url).collect();
        let built_names: Vec<String> = (0..built_tiles).map(built_tile_name).collect();

        let fetch = FakeFetch::default();
        {
            let mut bodies = fetch.bodies.borrow_mut();
            bodies.insert(S1_URL.to_string(), zip_bytes(&[S1_PAYLOAD, "GHS_S1/V1-0/GHS_S1_tile_1.tif"]));
            bodies.insert(
                SCHEMA_URL.to_string(),
                zip_bytes(&["S2_tile_schema.shp", "S2_tile_schema.shx", "S2_tile_schema.dbf"]),
            );
            for url in &s2_urls {
                bodies.insert(url.clone(), b"GeoTIFF".to_vec());
            }
            for name in &built_names {
                bodies.insert(format!("{}/{}.zip", TILES_URL, name), zip_bytes(&[&format!("{}.tif", name)]));
            }
        }

        let runner = FakeGrass {
            gisdbase,
            calls: RefCell::new(Vec::new()),
            maps: RefCell::new(BTreeSet::new()),
            missing: RefCell::new(Vec::new()),
            fail: RefCell::new(None),
            imported_index: RefCell::new(None),
            s2_urls,
            built_tiles: built_names,
        };

        let config = ImportConfig {
            sources: Sources {
                s1_archive_url: S1_URL.to_string(),
                s1_payload: PathBuf::from(S1_PAYLOAD),
                s2_tile_schema_url: SCHEMA_URL.to_string(),
                built_tiles_base_url: TILES_URL.to_string(),
            },
            ..ImportConfig::default()
        };

        Fixture {
            temp,
            workspace,
            grass: Grass::new(runner),
            fetch,
            config,
        }
    }

    pub fn runner(&self) -> &FakeGrass {
        self.grass.runner()
    }

    /// Calls of `module` in call order.
    pub fn calls_of(&self, module: &str) -> Vec<String> {
        let prefix = format!("{} ", module);
        self.runner()
            .calls
            .borrow()
            .iter()
            .filter(|(_, call)| call.starts_with(&prefix))
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// Calls of `module` made in the temporary location.
    pub fn temp_calls_of(&self, module: &str) -> Vec<String> {
        let prefix = format!("{} ", module);
        self.runner()
            .calls
            .borrow()
            .iter()
            .filter(|(gisrc, call)| gisrc != self.workspace.gisrc() && call.starts_with(&prefix))
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// Maps left in the user's mapset.
    pub fn user_maps(&self) -> Vec<String> {
        self.runner()
            .maps
            .borrow()
            .iter()
            .filter(|(gisrc, _)| gisrc == self.workspace.gisrc())
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Value of `key` in a recorded call string.
    pub fn option_of(call: &str, key: &str) -> Option<String> {
        let prefix = format!("{}=", key);
        call.split(' ')
            .find_map(|arg| arg.strip_prefix(&prefix).map(str::to_string))
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.temp.path().join("downloads")
    }
}
