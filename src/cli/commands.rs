//! CLI command implementations
//!
//! `serve` boots the HTTP API. `interview` and `pipe` drive the same
//! `DiagnosisService` directly over stdin/stdout, so they behave exactly like
//! the HTTP endpoints.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::engine::{
    AnswerRequest, AnswerTextRequest, CategoryRequest, DiagnosisError, DiagnosisService,
};
use crate::http_server::{DiagnoseState, HttpServer};
use crate::observability::{log_event, Event, ObservationScope};
use crate::remediation::FinalResult;
use crate::store::SessionStore;

use super::args::Command;
use super::config::{load_catalog, AppConfig};
use super::errors::{CliError, CliResult};
use super::io::{read_requests, write_error, write_response};

/// Main CLI entry point; the only function main.rs calls
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::CheckCatalog { catalog } => check_catalog(catalog.as_deref()),
        Command::ExportCatalog { catalog } => export_catalog(catalog.as_deref()),
        Command::Interview { category, config } => interview(&category, config.as_deref()),
        Command::Pipe { config } => pipe(config.as_deref()),
    }
}

/// Boot sequence: config, catalog, store, then the listener
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    log_event(Event::StartupBegin, &[]);
    let scope = ObservationScope::new("AUTODIAG_BOOT");

    let booted = AppConfig::load_or_default(config_path).and_then(|mut config| {
        if let Some(port) = port {
            config.http.port = port;
        }
        let service = config.build_service()?;
        Ok(HttpServer::with_config(
            config.http.clone(),
            DiagnoseState::new(service),
        ))
    });
    let server = match booted {
        Ok(server) => {
            scope.complete();
            server
        }
        Err(e) => {
            scope.fail(e.message());
            return Err(e);
        }
    };
    let addr = server.socket_addr();
    log_event(Event::StartupComplete, &[("addr", addr.as_str())]);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Validate a catalog and print a summary
pub fn check_catalog(catalog_path: Option<&Path>) -> CliResult<()> {
    check_catalog_to(catalog_path, &mut io::stdout())
}

pub fn check_catalog_to<W: Write>(catalog_path: Option<&Path>, out: &mut W) -> CliResult<()> {
    let catalog = load_catalog(catalog_path)?;

    let categories: Vec<Value> = catalog
        .categories()
        .filter_map(|c| catalog.bank(c))
        .map(|bank| {
            json!({
                "category": bank.category,
                "hypotheses": bank.hypotheses.len(),
                "questions": bank.questions.len(),
                "critical_rules": bank.critical_rules.len(),
                "question_budget": bank.question_budget,
            })
        })
        .collect();

    write_response(out, json!({ "valid": true, "categories": categories }))
}

pub fn export_catalog(catalog_path: Option<&Path>) -> CliResult<()> {
    export_catalog_to(catalog_path, &mut io::stdout())
}

/// Write the catalog as JSON; the output loads back with `--catalog`
pub fn export_catalog_to<W: Write>(catalog_path: Option<&Path>, out: &mut W) -> CliResult<()> {
    let catalog = load_catalog(catalog_path)?;
    writeln!(out, "{}", catalog.to_json()?)?;
    out.flush()?;
    Ok(())
}

pub fn interview(category: &str, config_path: Option<&Path>) -> CliResult<()> {
    let service = AppConfig::load_or_default(config_path)?.build_service()?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    interview_with(&service, category, stdin.lock(), &mut stdout).map(|_| ())
}

/// Run one interview over arbitrary reader/writer
pub fn interview_with<S, R, W>(
    service: &DiagnosisService<S>,
    category: &str,
    mut input: R,
    out: &mut W,
) -> CliResult<FinalResult>
where
    S: SessionStore,
    R: BufRead,
    W: Write,
{
    let started = service.select_category(CategoryRequest {
        session_id: None,
        category: category.to_string(),
        vehicle_context: None,
        location_context: None,
    })?;
    let session_id = started.session_id;
    let mut question = started.question;
    let mut clarifying = false;

    loop {
        writeln!(out)?;
        if clarifying {
            writeln!(out, "Follow-up:")?;
        }
        writeln!(out, "{}", question.text)?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(out, "  {}) {}", i + 1, option.label)?;
        }
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(CliError::io_error("input closed before the interview finished"));
        }

        let response = match service.submit_free_text(AnswerTextRequest {
            session_id: session_id.clone(),
            question_id: question.id.clone(),
            text: line.trim().to_string(),
        }) {
            Ok(response) => response,
            Err(DiagnosisError::UnknownOption { .. }) => {
                writeln!(out, "Please answer with one of the numbers above.")?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(result) = response.final_result {
            print_result(out, &result)?;
            return Ok(result);
        }
        clarifying = response.clarifying;
        question = response.question.ok_or_else(|| {
            CliError::from(DiagnosisError::InvalidState(
                "response carries neither question nor result".to_string(),
            ))
        })?;
    }
}

fn print_result<W: Write>(out: &mut W, result: &FinalResult) -> CliResult<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Most likely: {} ({:.1}%)",
        result.top_hypothesis.display_name, result.confidence
    )?;
    writeln!(
        out,
        "Safety score: {} ({})",
        result.safety_score, result.urgency
    )?;
    if result.workshop_recommended {
        writeln!(out, "A workshop visit is recommended.")?;
    }
    writeln!(
        out,
        "Typical cost: {}-{} {}",
        result.cost_range.min, result.cost_range.max, result.cost_range.currency
    )?;
    for path in &result.solution_paths {
        writeln!(
            out,
            "  - {}: {}-{} {}, {}-{} h, {:?}",
            path.kind,
            path.cost_estimate.min,
            path.cost_estimate.max,
            path.cost_estimate.currency,
            path.time_estimate.min_hours,
            path.time_estimate.max_hours,
            path.difficulty
        )?;
    }
    out.flush()?;
    Ok(())
}

/// One JSON request per stdin line, tagged by `op`
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PipeRequest {
    Category(CategoryRequest),
    Answer(AnswerRequest),
    AnswerText(AnswerTextRequest),
    Session { session_id: String },
    Evict,
}

pub fn pipe(config_path: Option<&Path>) -> CliResult<()> {
    let service = AppConfig::load_or_default(config_path)?.build_service()?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    pipe_with(&service, stdin.lock(), &mut stdout)
}

/// Serve JSON-lines requests until input ends. Bad lines get an error
/// response; the loop keeps going.
pub fn pipe_with<S, R, W>(service: &DiagnosisService<S>, input: R, out: &mut W) -> CliResult<()>
where
    S: SessionStore,
    R: BufRead,
    W: Write,
{
    for line in read_requests(input) {
        let request = match line.and_then(|value| {
            serde_json::from_value::<PipeRequest>(value)
                .map_err(|e| CliError::invalid_request(e.to_string()))
        }) {
            Ok(request) => request,
            Err(e) => {
                write_error(out, e.code_str(), e.message())?;
                continue;
            }
        };

        match dispatch(service, request) {
            Ok(data) => write_response(out, data)?,
            Err(e) => write_error(out, e.code(), e.user_message())?,
        }
    }
    Ok(())
}

fn dispatch<S: SessionStore>(
    service: &DiagnosisService<S>,
    request: PipeRequest,
) -> Result<Value, DiagnosisError> {
    let to_value = |r: Result<Value, serde_json::Error>| {
        r.map_err(|e| DiagnosisError::Configuration(format!("serialize response: {}", e)))
    };
    match request {
        PipeRequest::Category(req) => to_value(serde_json::to_value(service.select_category(req)?)),
        PipeRequest::Answer(req) => to_value(serde_json::to_value(service.submit_answer(req)?)),
        PipeRequest::AnswerText(req) => {
            to_value(serde_json::to_value(service.submit_free_text(req)?))
        }
        PipeRequest::Session { session_id } => {
            to_value(serde_json::to_value(service.snapshot(&session_id)?))
        }
        PipeRequest::Evict => {
            let evicted = service.evict_idle(chrono::Utc::now())?;
            Ok(json!({ "evicted": evicted }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use crate::catalog::Catalog;
    use crate::engine::DiagnosisEngine;
    use crate::session::{TerminationPolicy, TerminationReason};
    use crate::store::InMemorySessionStore;

    fn service() -> DiagnosisService<InMemorySessionStore> {
        DiagnosisService::new(
            DiagnosisEngine::new(
                Arc::new(Catalog::builtin().unwrap()),
                TerminationPolicy::default(),
            ),
            InMemorySessionStore::new(),
        )
    }

    #[test]
    fn test_interview_reaches_result() {
        let service = service();
        // squeal: yes, last service: garbage then "1" (over_30k)
        let input = Cursor::new("yes\nwhat?\n1\n");
        let mut out = Vec::new();

        let result = interview_with(&service, "brakes", input, &mut out).unwrap();
        let transcript = String::from_utf8(out).unwrap();

        assert_eq!(result.top_hypothesis.id, "worn_pads");
        assert_eq!(result.termination_reason, TerminationReason::ConfidenceReached);
        assert!(transcript.contains("Please answer with one of the numbers above."));
        assert!(transcript.contains("Most likely: Worn brake pads"));
    }

    #[test]
    fn test_interview_eof_is_error() {
        let service = service();
        let mut out = Vec::new();
        let err = interview_with(&service, "engine", Cursor::new(""), &mut out).unwrap_err();
        assert_eq!(err.code_str(), "DIAG_CLI_IO_ERROR");
    }

    #[test]
    fn test_interview_unknown_category() {
        let service = service();
        let mut out = Vec::new();
        let err = interview_with(&service, "gearbox", Cursor::new("1\n"), &mut out).unwrap_err();
        assert_eq!(err.code_str(), "DIAG_CLI_DIAGNOSIS_FAILED");
    }

    #[test]
    fn test_pipe_round_trip() {
        let service = service();
        let answer = |question: &str| {
            json!({
                "op": "answer",
                "session_id": "p1",
                "question_id": question,
                "option_value": "yes"
            })
        };
        let requests = [
            json!({"op": "category", "session_id": "p1", "category": "brakes"}),
            answer("brakes_squeal"),
            answer("nope"),
            json!({"op": "fly"}),
            json!({"op": "session", "session_id": "p1"}),
        ];
        let input = Cursor::new(
            requests
                .iter()
                .map(|r| format!("{}\n", r))
                .collect::<String>(),
        );
        let mut out = Vec::new();
        pipe_with(&service, input, &mut out).unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0]["data"]["question"]["id"], "brakes_squeal");
        assert_eq!(lines[1]["data"]["question"]["id"], "brakes_last_service");
        assert_eq!(lines[2]["code"], "DIAG_UNKNOWN_QUESTION");
        assert_eq!(lines[3]["code"], "DIAG_CLI_INVALID_REQUEST");
        assert_eq!(lines[4]["data"]["version"], 2);
        assert_eq!(lines[4]["data"]["state"], "QUESTIONING");
    }

    #[test]
    fn test_exported_catalog_loads_back() {
        let mut out = Vec::new();
        export_catalog_to(None, &mut out).unwrap();

        let exported = String::from_utf8(out).unwrap();
        let catalog = Catalog::from_json_str(&exported).unwrap();
        assert_eq!(catalog.len(), 5);

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, &exported).unwrap();
        let mut summary = Vec::new();
        check_catalog_to(Some(path.as_path()), &mut summary).unwrap();

        let summary: Value = serde_json::from_slice(&summary).unwrap();
        assert_eq!(summary["status"], "ok");
        assert_eq!(summary["data"]["valid"], true);
        assert_eq!(summary["data"]["categories"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_pipe_writes_one_envelope_per_request() {
        let service = service();
        let input = Cursor::new(
            "{\"op\":\"category\",\"session_id\":\"e1\",\"category\":\"engine\"}\n\
             {\"op\":\"category\",\"category\":\"climate\"}\n\
             not json\n\
             {\"op\":\"evict\"}\n",
        );
        let mut out = Vec::new();
        pipe_with(&service, input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        for line in lines {
            let envelope: Value = serde_json::from_str(line).unwrap();
            let status = envelope["status"].as_str().unwrap();
            assert!(status == "ok" || status == "error");
            assert!(envelope.get("event").is_none());
        }
    }
}
