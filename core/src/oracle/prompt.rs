use crate::candidates::dependencies::DependencyGroup;
use crate::candidates::pairs::CandidatePair;
use crate::error::CoreResult;
use crate::facts::model::Endpoint;
use crate::oracle::interface::{OracleErrorCategory, OracleFailure};

const ENDPOINT_SYSTEM: &str = "You are an expert API reviewer. Your job is to determine if two REST API endpoints from different microservices are functionally equivalent, conflicting, or unrelated. Consider HTTP method, path, and context. Respond with 'Conflict', 'Equivalent', or 'No Conflict', and explain your reasoning.";

const DEPENDENCY_SYSTEM: &str = "You are an expert Java dependency manager. Given the following dependency and its versions across multiple microservices, determine if there is a conflict, what the risks are, and recommend a resolution. If there are multiple versions, recommend updating all services to the latest version unless there is a strong reason not to. If all services use the same version, confirm there is no conflict and explain why. Start your answer with 'Conflict' or 'No Conflict'.";

/// A system + user message pair, already rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

/// Double every brace so dynamic text cannot be read as a placeholder.
pub fn escape_braces(s: &str) -> String {
    s.replace('{', "{{").replace('}', "}}")
}

/// Render `{name}` placeholders from `vars`; `{{` and `}}` are literal braces.
/// Values are inserted as-is and never rescanned.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> CoreResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => return Err(template_error("unterminated placeholder")),
                    }
                }
                let value = vars
                    .iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| template_error(&format!("no value for {{{}}}", name)))?;
                out.push_str(value);
            }
            '}' => return Err(template_error("single '}' in template")),
            other => out.push(other),
        }
    }
    Ok(out)
}

fn template_error(msg: &str) -> crate::error::CoreError {
    OracleFailure::new(OracleErrorCategory::PROMPT_TEMPLATE, msg).into()
}

fn describe_endpoint(ep: &Endpoint) -> String {
    format!(
        "{} {} (Class: {}, Method: {})",
        escape_braces(&ep.http_method),
        escape_braces(&ep.path),
        escape_braces(&ep.class_name),
        escape_braces(&ep.method_name)
    )
}

pub fn endpoint_prompt(pair: &CandidatePair) -> CoreResult<ChatPrompt> {
    let template = format!(
        "Service A: {}\nEndpoint 1: {}\nService B: {}\nEndpoint 2: {}",
        escape_braces(&pair.service_a),
        describe_endpoint(&pair.endpoint_a),
        escape_braces(&pair.service_b),
        describe_endpoint(&pair.endpoint_b)
    );
    Ok(ChatPrompt {
        system: ENDPOINT_SYSTEM.to_string(),
        user: render_template(&template, &[])?,
    })
}

pub fn dependency_prompt(group: &DependencyGroup) -> CoreResult<ChatPrompt> {
    let versions: Vec<String> = group.versions().iter().map(|v| escape_braces(v)).collect();
    let usage: Vec<String> = group
        .usages
        .iter()
        .map(|u| {
            format!(
                "{}: {}",
                escape_braces(&u.version),
                escape_braces(&u.services.join(", "))
            )
        })
        .collect();

    let mut template = format!(
        "Dependency: {}\nVersions found: {}\nService usage: {}",
        escape_braces(&group.name),
        versions.join(", "),
        usage.join("; ")
    );
    let latest = group.latest_version.clone().unwrap_or_default();
    if group.latest_version.is_some() {
        template.push_str("\nLatest version: {latest_version}");
    }
    template.push_str("\nPlease provide a clear recommendation.");

    Ok(ChatPrompt {
        system: DEPENDENCY_SYSTEM.to_string(),
        user: render_template(&template, &[("latest_version", latest.as_str())])?,
    })
}
