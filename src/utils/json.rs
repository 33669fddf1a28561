use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Reads a JSON document from `path`.
pub fn load_json<T, P>(path: P) -> Result<T, Box<dyn Error>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Writes `data` to `path` as pretty-printed JSON, replacing any previous content.
pub fn save_json<T, P>(data: &T, path: P) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("kbc-json-{}.json", std::process::id()));
        let data = BTreeMap::from([("rules".to_owned(), vec!["(+ $x 0)".to_owned()])]);

        save_json(&data, &path).unwrap();
        let loaded: BTreeMap<String, Vec<String>> = load_json(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, data);
    }

    #[test]
    fn missing_file() {
        let path = std::env::temp_dir().join("kbc-json-does-not-exist.json");
        assert!(load_json::<Vec<String>, _>(&path).is_err());
    }
}
