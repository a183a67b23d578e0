use std::path::{Path, PathBuf};

use cctx_graph::LayoutConfig;

use crate::paths::CctxPaths;

pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7433;
pub const DEFAULT_RECENT_LIMIT: usize = 6;

/// Keys [`CctxConfig::from_map`] understands.
pub const KNOWN_KEYS: &[&str] = &[
    "layout.git_x",
    "layout.claude_x",
    "layout.spacing",
    "layout.padding_top",
    "layout.padding_bottom",
    "layout.node_radius",
    "serve.bind",
    "serve.port",
    "dashboard.recent_limit",
    "capture.claude_home",
];

/// Read `.cctx/config.json`. Returns empty map if file doesn't exist.
pub fn read_config(path: &Path) -> anyhow::Result<ConfigMap> {
    if !path.exists() {
        return Ok(ConfigMap::new());
    }
    let content = std::fs::read_to_string(path)?;
    let val: serde_json::Value = serde_json::from_str(&content)?;
    match val {
        serde_json::Value::Object(map) => Ok(map),
        _ => Ok(ConfigMap::new()),
    }
}

pub fn write_config(path: &Path, config: &ConfigMap) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    crate::write_atomic(path, json.as_bytes())
}

/// Parse a string value into an appropriate JSON value (bool/number/string).
pub fn parse_value(s: &str) -> serde_json::Value {
    match s {
        "true" => serde_json::Value::Bool(true),
        "false" => serde_json::Value::Bool(false),
        _ => {
            if let Ok(n) = s.parse::<i64>() {
                serde_json::Value::Number(n.into())
            } else if let Ok(f) = s.parse::<f64>() {
                serde_json::json!(f)
            } else {
                serde_json::Value::String(s.to_string())
            }
        }
    }
}

/// Typed view over `.cctx/config.json` with defaults and env overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct CctxConfig {
    pub layout: LayoutConfig,
    pub bind: String,
    pub port: u16,
    pub recent_limit: usize,
    pub claude_home: PathBuf,
}

impl Default for CctxConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            recent_limit: DEFAULT_RECENT_LIMIT,
            claude_home: default_claude_home(),
        }
    }
}

fn default_claude_home() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".claude"))
        .unwrap_or_else(|| PathBuf::from(".claude"))
}

fn get_f64(map: &ConfigMap, key: &str, default: f64) -> f64 {
    map.get(key).and_then(|v| v.as_f64()).unwrap_or(default)
}

fn get_u64(map: &ConfigMap, key: &str) -> Option<u64> {
    map.get(key).and_then(|v| v.as_u64())
}

impl CctxConfig {
    /// Build from a raw map. Unknown keys are ignored; wrong types fall back to defaults.
    pub fn from_map(map: &ConfigMap) -> Self {
        let d = Self::default();
        let layout = LayoutConfig {
            git_x: get_f64(map, "layout.git_x", d.layout.git_x),
            claude_x: get_f64(map, "layout.claude_x", d.layout.claude_x),
            // Rows must strictly increase down the column.
            spacing: Some(get_f64(map, "layout.spacing", d.layout.spacing))
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or(d.layout.spacing),
            padding_top: get_f64(map, "layout.padding_top", d.layout.padding_top),
            padding_bottom: get_f64(map, "layout.padding_bottom", d.layout.padding_bottom),
            node_radius: get_f64(map, "layout.node_radius", d.layout.node_radius),
        };
        Self {
            layout,
            bind: map
                .get("serve.bind")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or(d.bind),
            port: get_u64(map, "serve.port")
                .and_then(|p| u16::try_from(p).ok())
                .unwrap_or(d.port),
            recent_limit: get_u64(map, "dashboard.recent_limit")
                .map(|n| n as usize)
                .unwrap_or(d.recent_limit),
            claude_home: map
                .get("capture.claude_home")
                .and_then(|v| v.as_str())
                .map(PathBuf::from)
                .unwrap_or(d.claude_home),
        }
    }

    /// Apply `CCTX_PORT` / `CCTX_CLAUDE_HOME`.
    fn apply_env(mut self) -> Self {
        if let Some(port) = std::env::var("CCTX_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.port = port;
        }
        if let Ok(home) = std::env::var("CCTX_CLAUDE_HOME") {
            if !home.is_empty() {
                self.claude_home = PathBuf::from(home);
            }
        }
        self
    }

    pub fn load(paths: &CctxPaths) -> anyhow::Result<Self> {
        let map = read_config(&paths.config_json)?;
        let cfg = Self::from_map(&map).apply_env();
        tracing::debug!(port = cfg.port, claude_home = %cfg.claude_home.display(), "loaded config");
        Ok(cfg)
    }
}
