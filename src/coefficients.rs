//! Raw materials and their stored kinetic coefficients.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::*;
use crate::model::KineticParameters;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaterial {
    pub id: u32,
    pub name: String,
}

/// Read side: everything a sweep needs.
pub trait CoefficientProvider {
    /// All raw materials, ordered by name.
    fn raw_materials(&self) -> Vec<RawMaterial>;

    /// Coefficients stored for `id`, if any.
    fn coefficients(&self, id: u32) -> Option<KineticParameters>;

    fn find_by_name(&self, name: &str) -> Option<RawMaterial> {
        self.raw_materials().into_iter().find(|m| m.name == name)
    }
}

/// Write side, used by administration commands only.
pub trait CoefficientStore: CoefficientProvider {
    fn add_raw_material(&mut self, name: &str) -> Result<u32>;
    fn set_coefficients(&mut self, id: u32, params: KineticParameters) -> Result<()>;
}

/// Raw materials every fresh store starts with.
pub fn default_raw_materials() -> Vec<(&'static str, KineticParameters)> {
    vec![
        (
            "Feedstock A",
            KineticParameters {
                k1: 0.1,
                k2: 0.2,
                vr: 10.0,
                q_min: 1.0,
                q_max: 10.0,
                dq: 1.0,
                ca_in_min: 0.1,
                ca_in_max: 1.0,
                d_ca_in: 0.1,
            },
        ),
        (
            "Feedstock B",
            KineticParameters {
                k1: 0.05,
                k2: 0.15,
                vr: 8.0,
                q_min: 1.0,
                q_max: 8.0,
                dq: 1.0,
                ca_in_min: 0.1,
                ca_in_max: 0.8,
                d_ca_in: 0.1,
            },
        ),
    ]
}

// ── Catalog (shared state of both stores) ───────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    id: u32,
    name: String,
    coefficients: Option<KineticParameters>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Catalog {
    entries: Vec<Entry>,
}

impl Catalog {
    fn seeded() -> Self {
        let mut catalog = Self::default();
        for (name, params) in default_raw_materials() {
            if let Ok(id) = catalog.add(name)
                && catalog.set(id, params).is_ok()
            {
                tracing::trace!(name, id, "seeded raw material");
            }
        }
        catalog
    }

    fn list(&self) -> Vec<RawMaterial> {
        let mut list: Vec<RawMaterial> = self
            .entries
            .iter()
            .map(|e| RawMaterial {
                id: e.id,
                name: e.name.clone(),
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    fn get(&self, id: u32) -> Option<KineticParameters> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.coefficients)
    }

    fn add(&mut self, name: &str) -> Result<u32> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ReactorError::Configuration(
                "raw material name must not be empty".into(),
            ));
        }
        if self.entries.iter().any(|e| e.name == name) {
            return Err(ReactorError::DuplicateRawMaterial(name.to_string()));
        }
        let id = self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        self.entries.push(Entry {
            id,
            name: name.to_string(),
            coefficients: None,
        });
        Ok(id)
    }

    fn set(&mut self, id: u32, params: KineticParameters) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ReactorError::RawMaterialNotFound(format!("id {id}")))?;
        entry.coefficients = Some(params);
        Ok(())
    }
}

// ── In-memory store ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    catalog: Catalog,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding [`default_raw_materials`].
    pub fn seeded() -> Self {
        Self {
            catalog: Catalog::seeded(),
        }
    }
}

impl CoefficientProvider for MemoryStore {
    fn raw_materials(&self) -> Vec<RawMaterial> {
        self.catalog.list()
    }

    fn coefficients(&self, id: u32) -> Option<KineticParameters> {
        self.catalog.get(id)
    }
}

impl CoefficientStore for MemoryStore {
    fn add_raw_material(&mut self, name: &str) -> Result<u32> {
        self.catalog.add(name)
    }

    fn set_coefficients(&mut self, id: u32, params: KineticParameters) -> Result<()> {
        self.catalog.set(id, params)
    }
}

// ── JSON file store ─────────────────────────────────────────────────

/// Store persisted as pretty-printed JSON, rewritten on every change.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    catalog: Catalog,
}

impl JsonStore {
    /// Open `path`, creating it with the default raw materials if it
    /// does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let catalog = serde_json::from_str(&content)?;
            return Ok(Self { path, catalog });
        }

        let store = Self {
            path,
            catalog: Catalog::seeded(),
        };
        store.save()?;
        tracing::info!(path = %store.path.display(), "created coefficient store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.catalog)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl CoefficientProvider for JsonStore {
    fn raw_materials(&self) -> Vec<RawMaterial> {
        self.catalog.list()
    }

    fn coefficients(&self, id: u32) -> Option<KineticParameters> {
        self.catalog.get(id)
    }
}

impl CoefficientStore for JsonStore {
    fn add_raw_material(&mut self, name: &str) -> Result<u32> {
        let id = self.catalog.add(name)?;
        self.save()?;
        Ok(id)
    }

    fn set_coefficients(&mut self, id: u32, params: KineticParameters) -> Result<()> {
        self.catalog.set(id, params)?;
        self.save()
    }
}
