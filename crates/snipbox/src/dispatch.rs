//! Request dispatch
//!
//! Maps a validated request onto its backend with the per-language budget
//! and folds every backend failure into the response's error field; nothing
//! escapes as a panic or a propagated error.

use std::time::Duration;

use tracing::{info, instrument};

use crate::backend::{compiled, js, lua, php, python, wasm};
use crate::config::Config;
use crate::error::RunnerError;
use crate::normalize::truncate_output;
use crate::sniff::detect_source;
use crate::types::{ExecutionRequest, LanguageTag, RunResponse};

const JS_BUDGET: Duration = Duration::from_secs(2);
const PYTHON_BUDGET: Duration = Duration::from_secs(6);
const LUA_BUDGET: Duration = Duration::from_secs(3);
const PHP_BUDGET: Duration = Duration::from_secs(4);
const WASM_BUDGET: Duration = Duration::from_secs(5);
const JAVA_BUDGET: Duration = Duration::from_secs(8);
const COMPILED_BUDGET: Duration = Duration::from_secs(10);

/// Snippet runner over a toolchain configuration.
#[derive(Debug, Clone)]
pub struct Runner {
    config: Config,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Execute one request, always returning a terminal response.
    #[instrument(skip(self, request), fields(language = %request.language))]
    pub async fn run(&self, id: &str, request: &ExecutionRequest) -> RunResponse {
        let tag = request.language.trim().to_lowercase();

        if tag.is_empty() || request.code.trim().is_empty() {
            return RunResponse::failure(id, tag, "Missing language or code".to_owned());
        }

        let Some(language) = LanguageTag::parse(&tag) else {
            return RunResponse::failure(id, &tag, format!("Language {tag} not supported"));
        };

        let result = self.dispatch(language, &request.code).await;
        match result {
            Ok(output) => {
                info!(language = %language, "run succeeded");
                RunResponse::success(id, language.as_str(), truncate_output(output))
            }
            Err(err) => {
                info!(language = %language, error = %err, "run failed");
                RunResponse::failure(id, language.as_str(), truncate_output(err.to_string()))
            }
        }
    }

    async fn dispatch(&self, language: LanguageTag, code: &str) -> Result<String, RunnerError> {
        match language {
            LanguageTag::Javascript => js::execute(code, JS_BUDGET).await,
            LanguageTag::Python => python::execute(code, PYTHON_BUDGET).await,
            LanguageTag::Lua => lua::execute(code, LUA_BUDGET).await,
            LanguageTag::Php => php::execute(code, PHP_BUDGET).await,
            LanguageTag::Wasm | LanguageTag::Zig => wasm::execute_base64(code, WASM_BUDGET).await,
            LanguageTag::Go => {
                // Source markers route through the TinyGo chain; anything
                // else is treated as an encoded module
                if detect_source(code).is_some() {
                    self.run_toolchain(language, code, COMPILED_BUDGET).await
                } else {
                    wasm::execute_base64(code, WASM_BUDGET).await
                }
            }
            LanguageTag::Java => self.run_toolchain(language, code, JAVA_BUDGET).await,
            LanguageTag::C | LanguageTag::Cpp | LanguageTag::Rust => {
                self.run_toolchain(language, code, COMPILED_BUDGET).await
            }
        }
    }

    async fn run_toolchain(
        &self,
        language: LanguageTag,
        code: &str,
        budget: Duration,
    ) -> Result<String, RunnerError> {
        let toolchain = self
            .config
            .get_toolchain(language.as_str())
            .map_err(|e| RunnerError::UnsupportedFeature(e.to_string()))?;
        compiled::run(language.as_str(), toolchain, code, budget).await
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
