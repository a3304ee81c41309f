//! Reagent demo binary
//!
//! Runs a single tool-calling agent against a task and prints the
//! outcome. The crawl tool is registered when an endpoint is supplied.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use reagent_core::{
    Config, LoopStatus, OpenAiCompatClient, PlanExecutionRecorder, ReactLoop, RecordStatus,
    ToolCallAgent, ToolRegistry,
};
use reagent_tools::{HttpCrawlerService, WebCrawlerTool};

#[derive(Parser)]
#[command(name = "reagent", about = "Run a tool-calling agent on a task")]
struct Args {
    /// Task for the agent to work on
    task: String,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Plan id to record under; a fresh UUID when omitted
    #[arg(long)]
    plan_id: Option<String>,

    /// Crawl API endpoint; enables the web_crawler tool
    #[arg(long, env = "REAGENT_CRAWL_ENDPOINT")]
    crawl_endpoint: Option<String>,

    /// Crawl API token
    #[arg(long, env = "REAGENT_CRAWL_TOKEN", default_value = "")]
    crawl_token: String,

    /// Write the plan execution record to this file as JSON
    #[arg(long)]
    record_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reagent=info,reagent_core=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path).context("failed to load configuration")?,
        None => Config::default(),
    };

    let mut registry = ToolRegistry::new();
    let mut allow_list = Vec::new();
    if let Some(endpoint) = &args.crawl_endpoint {
        let service = HttpCrawlerService::new(endpoint, args.crawl_token.clone())
            .context("failed to create crawl client")?;
        registry.register(Arc::new(WebCrawlerTool::new(service)));
        allow_list.push("web_crawler".to_string());
    }

    let chat_model = Arc::new(OpenAiCompatClient::new(config.model.clone())?);
    let recorder = Arc::new(PlanExecutionRecorder::new());

    let mut builder = ToolCallAgent::builder("reagent")
        .description("general-purpose tool-calling agent")
        .system_prompt("You are a helpful agent. Use the available tools to work on the task.")
        .next_step_prompt("Work on the task: {task}")
        .data("task", args.task.clone())
        .available_tools(allow_list)
        .chat_model(chat_model)
        .recorder(recorder.clone())
        .retrieve_size(config.agent.memory_retrieve_size);
    if let Some(plan_id) = &args.plan_id {
        builder = builder.plan_id(plan_id.clone());
    }
    let mut agent = builder.build(&registry)?;

    let outcome = ReactLoop::new(config.agent.max_steps)
        .run(&mut agent)
        .await;

    let status = match outcome.status {
        LoopStatus::Completed => RecordStatus::Success,
        _ => RecordStatus::Error,
    };
    agent.finish(status, outcome.last_result.clone())?;

    println!("status: {:?}", outcome.status);
    println!("steps:  {}", outcome.steps_taken);
    if let Some(result) = &outcome.last_result {
        println!("result: {result}");
    }
    if let Some(failure) = &outcome.failure {
        println!("failure: {failure}");
    }

    if let Some(path) = &args.record_out {
        recorder
            .save_plan(agent.plan_id(), path)
            .context("failed to write execution record")?;
        println!("record written to {}", path.display());
    }

    Ok(())
}
