//! Material and binding record serialization (RON)

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::matl::Matl;
use crate::modl::Modl;

/// Writes material records to an output target
pub trait MatlWriter {
    fn write_matl(&self, matl: &Matl, path: &Path) -> Result<(), SerializeError>;
}

/// RON text format for material and binding records
#[derive(Debug, Clone, Copy, Default)]
pub struct RonFormat;

impl MatlWriter for RonFormat {
    fn write_matl(&self, matl: &Matl, path: &Path) -> Result<(), SerializeError> {
        save_ron(matl, path)
    }
}

/// Load material records from a RON file
pub fn load_matl(path: impl AsRef<Path>) -> Result<Matl, SerializeError> {
    let matl: Matl = load_ron(path.as_ref())?;
    tracing::info!(
        "Loaded {} material entries from {:?}",
        matl.entries.len(),
        path.as_ref()
    );
    Ok(matl)
}

/// Load binding records from a RON file
pub fn load_modl(path: impl AsRef<Path>) -> Result<Modl, SerializeError> {
    let modl: Modl = load_ron(path.as_ref())?;
    tracing::info!(
        "Loaded {} binding entries from {:?}",
        modl.entries.len(),
        path.as_ref()
    );
    Ok(modl)
}

/// Save material records as a RON file
pub fn save_matl(matl: &Matl, path: impl AsRef<Path>) -> Result<(), SerializeError> {
    save_ron(matl, path.as_ref())
}

/// Save binding records as a RON file
pub fn save_modl(modl: &Modl, path: impl AsRef<Path>) -> Result<(), SerializeError> {
    save_ron(modl, path.as_ref())
}

fn load_ron<T: DeserializeOwned>(path: &Path) -> Result<T, SerializeError> {
    let content = std::fs::read_to_string(path).map_err(|e| SerializeError::Io(e.to_string()))?;
    ron::from_str(&content).map_err(|e| SerializeError::Deserialize(e.to_string()))
}

fn save_ron<T: Serialize>(value: &T, path: &Path) -> Result<(), SerializeError> {
    let content = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .map_err(|e| SerializeError::Serialize(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| SerializeError::Io(e.to_string()))?;
    tracing::info!("Saved {:?}", path);
    Ok(())
}

/// Serialization errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SerializeError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        MatlBlendState, MatlEntry, MatlSampler, MatlVector4, MatlWrapMode, ModlEntry, ParamData,
        ParamId,
    };

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("{}-{}.ron", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_matl_file_round_trip() {
        let matl = Matl::new(vec![
            MatlEntry::new("mat_eye", "SFX_PBS_eye")
                .with_attribute(
                    ParamId::CustomVector(0),
                    ParamData::Vector4(MatlVector4::new(1.0, 0.5, 0.25, 1.0)),
                )
                .with_attribute(
                    ParamId::Sampler(0),
                    ParamData::Sampler(MatlSampler {
                        wrap_s: MatlWrapMode::Other(42),
                        ..Default::default()
                    }),
                )
                .with_attribute(
                    ParamId::BlendState(0),
                    ParamData::BlendState(MatlBlendState::default()),
                ),
        ]);

        let path = temp_path("matl");
        RonFormat.write_matl(&matl, &path).unwrap();
        let loaded = load_matl(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, matl);
    }

    #[test]
    fn test_modl_file_round_trip() {
        let modl = Modl::new("body", vec![ModlEntry::new("body", 1, "mat_skin")]);

        let path = temp_path("modl");
        save_modl(&modl, &path).unwrap();
        let loaded = load_modl(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, modl);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_matl(temp_path("missing"));
        assert!(matches!(result, Err(SerializeError::Io(_))));
    }
}
