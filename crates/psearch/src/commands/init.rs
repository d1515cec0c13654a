use anyhow::Result;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# psearch configuration

[search]
endpoint = "http://localhost:5000"
path = "/api/newsearch"

[quick]
api_path = "/api/newsearch/multisearch"

# Quick-search scopes: each fans the query out to its groups in one call.
[quick.scopes.cloud]
ui_url = "/search"

[[quick.scopes.cloud.groups]]
name = "Assets"
params = { node_type = "asset" }

[[quick.scopes.cloud.groups]]
name = "Blog"
params = { node_type = "post" }

[[quick.scopes.cloud.groups]]
name = "Groups"
params = { node_type = "group" }
"#;

/// Initialize a new config file
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    println!("Created config at {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.quick.scopes["cloud"].groups.len(), 3);
    }
}
