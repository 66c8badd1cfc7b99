//! Doctor command - verify backends and configuration.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::embedding::create_embedder;
use crate::generation::{candidates_from_specs, AnswerModel, ProbeConfig, ProbeOutcome, ProbeReport};
use console::style;
use std::time::Duration;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("StoryQA Doctor");
    println!();
    println!("Checking configuration and backends...\n");

    let mut checks = Vec::new();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![check_config_file(), check_settings(settings), check_document(settings)];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    if preflight::uses_openai(settings) {
        let key_check = match preflight::check_api_key() {
            Ok(()) => CheckResult::ok("OPENAI_API_KEY", "configured"),
            Err(e) => CheckResult::error("OPENAI_API_KEY", "missing", &e.to_string()),
        };
        key_check.print();
        checks.push(key_check);
    }

    println!();

    println!("{}", style("Embedding").bold());
    let embed_check = check_embedder(settings).await;
    embed_check.print();
    checks.push(embed_check);

    println!();

    println!("{}", style("Generation Backends").bold());
    let backend_checks = check_backends(settings).await;
    for check in &backend_checks {
        check.print();
    }
    checks.extend(backend_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using StoryQA.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!(
            "{} warning(s). StoryQA will work but some features may be limited.",
            warnings
        ));
    } else {
        Output::success("All checks passed! StoryQA is ready to use.");
    }

    Ok(())
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: storyqa config init",
        )
    }
}

fn check_settings(settings: &Settings) -> CheckResult {
    match settings.validate() {
        Ok(()) => CheckResult::ok(
            "Settings",
            &format!(
                "chunk size {}, overlap {}, k {}",
                settings.chunking.chunk_size, settings.chunking.overlap, settings.retrieval.k
            ),
        ),
        Err(e) => CheckResult::error("Settings", &e.to_string(), "Fix the values in the config file"),
    }
}

fn check_document(settings: &Settings) -> CheckResult {
    let path = settings.document_path(None);
    if path.is_file() {
        CheckResult::ok("Default document", &format!("{}", path.display()))
    } else {
        CheckResult::warning(
            "Default document",
            &format!("{} (not found)", path.display()),
            "Pass --document or set document.default_path",
        )
    }
}

/// Embed a short text with the configured embedder.
async fn check_embedder(settings: &Settings) -> CheckResult {
    let name = format!("{} ({})", settings.embedding.provider, settings.embedding.model);

    let embedder = match create_embedder(&settings.embedding) {
        Ok(embedder) => embedder,
        Err(e) => return CheckResult::error(&name, &e.to_string(), "Check the [embedding] section"),
    };

    let timeout = Duration::from_secs(settings.generation.probe_timeout_secs);
    match tokio::time::timeout(timeout, embedder.embed("test")).await {
        Ok(Ok(vector)) => CheckResult::ok(&name, &format!("{} dimensions", vector.len())),
        Ok(Err(e)) => CheckResult::error(&name, &e.to_string(), &embedder_hint(settings)),
        Err(_) => CheckResult::error(
            &name,
            &format!("timed out after {}s", timeout.as_secs()),
            &embedder_hint(settings),
        ),
    }
}

fn embedder_hint(settings: &Settings) -> String {
    match settings.embedding.provider {
        crate::config::EmbeddingProvider::Ollama => {
            format!("Run: `ollama pull {}`", settings.embedding.model)
        }
        crate::config::EmbeddingProvider::OpenAI => "Check OPENAI_API_KEY and network access".to_string(),
    }
}

/// Probe every configured backend in order.
async fn check_backends(settings: &Settings) -> Vec<CheckResult> {
    if settings.generation.backends.is_empty() {
        return vec![CheckResult::error(
            "Backends",
            "none configured",
            "Add a backend under [[generation.backends]]",
        )];
    }

    let candidates = match candidates_from_specs(&settings.generation.backends) {
        Ok(candidates) => candidates,
        Err(e) => {
            return vec![CheckResult::error(
                "Backends",
                &e.to_string(),
                "Check OPENAI_API_KEY and the [generation] section",
            )]
        }
    };

    let config = ProbeConfig::from(&settings.generation);
    let reports = AnswerModel::probe_all(&candidates, &config).await;
    let any_ready = reports.iter().any(ProbeReport::is_ready);

    reports
        .iter()
        .map(|report| report_check(report, any_ready))
        .collect()
}

/// A failing backend is only an error when no backend works at all.
fn report_check(report: &ProbeReport, any_ready: bool) -> CheckResult {
    let name = format!("#{} {}", report.position + 1, report.label);
    let hint = "Answers fall back to the next backend in order";
    let message = match &report.outcome {
        ProbeOutcome::Ready => return CheckResult::ok(&name, "ready"),
        ProbeOutcome::Failed(reason) => format!("failed: {}", reason),
        ProbeOutcome::TimedOut(after) => format!("timed out after {}s", after.as_secs()),
        ProbeOutcome::NotAttempted => "not probed".to_string(),
    };

    if any_ready {
        CheckResult::warning(&name, &message, hint)
    } else {
        CheckResult::error(&name, &message, "No backend is usable; answers will be disabled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: ProbeOutcome) -> ProbeReport {
        ProbeReport {
            position: 0,
            label: "ollama (mistral)".to_string(),
            outcome,
        }
    }

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_report_check_ready() {
        let check = report_check(&report(ProbeOutcome::Ready), true);
        assert_eq!(check.status, CheckStatus::Ok);
        assert_eq!(check.name, "#1 ollama (mistral)");
    }

    #[test]
    fn test_failed_backend_is_warning_when_another_works() {
        let check = report_check(&report(ProbeOutcome::Failed("refused".into())), true);
        assert_eq!(check.status, CheckStatus::Warning);
        assert!(check.message.contains("refused"));
    }

    #[test]
    fn test_failed_backend_is_error_when_none_work() {
        let check = report_check(&report(ProbeOutcome::TimedOut(Duration::from_secs(30))), false);
        assert_eq!(check.status, CheckStatus::Error);
        assert_eq!(check.message, "timed out after 30s");
    }

    #[test]
    fn test_invalid_settings_are_reported() {
        let mut settings = Settings::default();
        settings.chunking.overlap = settings.chunking.chunk_size;
        assert_eq!(check_settings(&settings).status, CheckStatus::Error);
    }
}
