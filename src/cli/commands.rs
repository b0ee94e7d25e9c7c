use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::logging::{init_logging_with_config, LogConfig};
use crate::middleware::{metrics_handler, MetricsMiddleware, SharedMiddleware, TracingMiddleware};
use crate::router::Router;
use crate::runtime_config::RuntimeConfig;
use crate::server::{AppService, HttpServer};

/// Command-line interface for treerouter
#[derive(Parser)]
#[command(name = "treerouter")]
#[command(about = "Segment-trie HTTP router demo service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the demo service
    Serve {
        /// Address to listen on; overrides the config file
        #[arg(long, env = "TREEROUTER_ADDR")]
        addr: Option<String>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Serve files from this directory under `/static`
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Print the demo service's route table
    Routes {
        /// Include files from this directory under `/static`
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

fn health(_req: &mut HandlerRequest, res: &mut HandlerResponse) {
    res.json(200, &serde_json::json!({ "status": "ok" }));
}

fn echo_param(req: &mut HandlerRequest, res: &mut HandlerResponse) {
    let query: serde_json::Map<String, serde_json::Value> = req
        .query_params
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(v.as_str())))
        .collect();
    res.json(
        200,
        &serde_json::json!({
            "value": req.get_path_param("value"),
            "query": query,
            "request_id": req.request_id,
        }),
    );
}

fn echo_body(req: &mut HandlerRequest, res: &mut HandlerResponse) {
    match req.json_body::<serde_json::Value>() {
        Ok(body) => res.json(200, &body),
        Err(e) => res.json_error(400, &format!("invalid JSON body: {e}")),
    }
}

fn get_user(req: &mut HandlerRequest, res: &mut HandlerResponse) {
    res.json(200, &serde_json::json!({ "id": req.get_path_param("id") }));
}

fn get_user_post(req: &mut HandlerRequest, res: &mut HandlerResponse) {
    res.json(
        200,
        &serde_json::json!({
            "user_id": req.get_path_param("id"),
            "post_id": req.get_path_param("post_id"),
        }),
    );
}

/// Routes of the demo service.
///
/// - `GET /health`, `GET /metrics`
/// - `GET /echo/:value`, `POST /echo`
/// - `/api/users/:id` and `/api/users/:id/posts/:post_id`, traced and metered
/// - every file of `static_dir` under `prefix`
pub fn build_demo_router(
    metrics: &Arc<MetricsMiddleware>,
    static_dir: Option<(&str, &Path)>,
) -> Result<Router> {
    let mut router = Router::new();
    router.get("/health", health);
    router.get("/metrics", metrics_handler(Arc::clone(metrics)));
    router.get("/echo/:value", echo_param);
    router.post("/echo", echo_body);

    {
        let metered: SharedMiddleware = Arc::clone(metrics) as SharedMiddleware;
        let mut api = router
            .group("/api")
            .with(TracingMiddleware)
            .with_shared(metered);
        api.get("/users/:id", get_user);
        api.get("/users/:id/posts/:post_id", get_user_post);
    }

    if let Some((prefix, dir)) = static_dir {
        router
            .static_dir(prefix, dir)
            .with_context(|| format!("Failed to mount static directory {}", dir.display()))?;
    }
    Ok(router)
}

/// Parse the process arguments and run the selected command
pub fn run_cli() -> Result<()> {
    run_command(Cli::parse())
}

pub fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            addr,
            config,
            static_dir,
        } => {
            let app_config = match &config {
                Some(path) => AppConfig::load(path)?,
                None => AppConfig::default(),
            };
            let _log_guard = init_logging_with_config(&app_config.log_config(LogConfig::from_env()))?;

            let runtime = RuntimeConfig::from_env();
            runtime.apply(app_config.server.workers);

            let statics = match (&static_dir, &app_config.static_files) {
                (Some(dir), _) => Some(("/static".to_string(), dir.clone())),
                (None, Some(sf)) => Some((sf.prefix.clone(), sf.dir.clone())),
                (None, None) => None,
            };
            let metrics = Arc::new(MetricsMiddleware::new());
            let router = build_demo_router(
                &metrics,
                statics.as_ref().map(|(p, d)| (p.as_str(), d.as_path())),
            )?;

            let addr = addr.unwrap_or(app_config.server.addr);
            info!(
                addr = %addr,
                stack_size = runtime.stack_size,
                route_count = router.tree().len(),
                "Starting treerouter"
            );
            let handle = HttpServer(AppService::from(router.into_dispatcher()))
                .start(addr.as_str())
                .with_context(|| format!("Failed to bind {addr}"))?;
            handle
                .join()
                .map_err(|e| anyhow!("server coroutine panicked: {e:?}"))?;
            Ok(())
        }
        Commands::Routes { static_dir } => {
            let metrics = Arc::new(MetricsMiddleware::new());
            let router = build_demo_router(
                &metrics,
                static_dir.as_deref().map(|d| ("/static", d)),
            )?;
            router.dump_routes();
            Ok(())
        }
    }
}
