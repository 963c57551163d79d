//! `nuget.config` source list parsing

use super::{is_element, parse_xml, read_file, split_bom};
use crate::domain::RegistrySource;
use crate::error::ManifestError;
use std::path::Path;
use tracing::debug;

/// Read the registry sources declared in a `nuget.config` file
pub fn read_sources(path: &Path) -> Result<Vec<RegistrySource>, ManifestError> {
    let content = read_file(path)?;
    parse_sources(path, &content)
}

/// Parse `<packageSources><add key value protocolVersion/></packageSources>` entries
///
/// Entries without `key` or `value` are skipped. Within a file the first
/// entry for a key wins.
pub fn parse_sources(path: &Path, content: &str) -> Result<Vec<RegistrySource>, ManifestError> {
    let (_, body) = split_bom(content);
    let doc = parse_xml(path, body)?;
    let mut sources: Vec<RegistrySource> = Vec::new();

    let entries = doc
        .descendants()
        .filter(|n| is_element(n, "packageSources"))
        .flat_map(|n| n.children())
        .filter(|n| is_element(n, "add"));

    for add in entries {
        let (Some(key), Some(url)) = (add.attribute("key"), add.attribute("value")) else {
            debug!(file = %path.display(), "skipping packageSources entry without key or value");
            continue;
        };
        if sources.iter().any(|s| s.key == key) {
            continue;
        }

        let mut source = RegistrySource::new(key, url);
        if let Some(protocol) = add.attribute("protocolVersion") {
            source = source.with_protocol_version(protocol);
        }
        sources.push(source);
    }

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <packageSources>
    <clear />
    <add key="nuget.org" value="https://api.nuget.org/v3/index.json" protocolVersion="3" />
    <add key="internal" value="https://pkgs.example.com/nuget/v2/" protocolVersion="2" />
    <add key="nuget.org" value="https://duplicate.example.com/index.json" />
    <add value="https://nokey.example.com/index.json" />
  </packageSources>
  <disabledPackageSources>
    <add key="internal" value="true" />
  </disabledPackageSources>
</configuration>"#;

    #[test]
    fn test_parse_sources() {
        let sources = parse_sources(Path::new("nuget.config"), CONFIG).unwrap();
        assert_eq!(sources.len(), 2);

        assert_eq!(sources[0].key, "nuget.org");
        assert_eq!(sources[0].url, "https://api.nuget.org/v3/index.json");
        assert_eq!(sources[0].protocol_version.as_deref(), Some("3"));

        assert_eq!(sources[1].key, "internal");
        assert_eq!(sources[1].protocol_version.as_deref(), Some("2"));
    }

    #[test]
    fn test_parse_sources_without_protocol_version() {
        let config = r#"<configuration><packageSources>
            <add key="feed" value="https://feed.example.com/index.json" />
        </packageSources></configuration>"#;
        let sources = parse_sources(Path::new("nuget.config"), config).unwrap();
        assert_eq!(sources[0].protocol_version, None);
    }

    #[test]
    fn test_parse_sources_no_section() {
        let sources = parse_sources(Path::new("nuget.config"), "<configuration />").unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_parse_sources_malformed() {
        let err = parse_sources(Path::new("nuget.config"), "<configuration>").unwrap_err();
        assert!(matches!(err, ManifestError::XmlParseError { .. }));
    }
}
