#[derive(Clone)]
pub enum Environment {
    Dev,
    Live,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Live => "live",
            Environment::Staging => "stg",
            Environment::Production => "prod",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Dev)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown environment: {0}")]
pub struct ParseEnvironmentError(String);

impl TryFrom<String> for Environment {
    type Error = ParseEnvironmentError;
    fn try_from(env: String) -> Result<Self, Self::Error> {
        match env.to_lowercase().as_str() {
            "live" => Ok(Environment::Live),
            "stg" => Ok(Environment::Staging),
            "prod" => Ok(Environment::Production),
            "dev" | "local" => Ok(Environment::Dev),
            _ => Err(ParseEnvironmentError(env)),
        }
    }
}
