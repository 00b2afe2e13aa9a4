use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogqConfig {
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub defaults: QueryDefaults,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsConfig {
    pub profile: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryDefaults {
    pub format: Option<String>,
    pub limit: Option<u32>,
    pub update_interval: Option<String>,
    pub exclude_metadata: Option<bool>,
    pub end_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub dir: Option<String>,
}
