use log::info;
use std::sync::Arc;

use crate::{
    ai::new_backend,
    analysis::{Analysis, AnalyzerRegistry},
    analyzer::CancelToken,
    cache::new_cache,
    cli::AnalyzeArgs,
    config::Config,
    kubernetes::{ClusterClient, KubeClient},
};

/// Connect to the cluster, run the analysis and return the rendered output.
pub async fn handle_analyze(
    args: AnalyzeArgs,
    config: &Config,
    cancel: CancelToken,
) -> crate::Result<String> {
    let client = match &args.kube_context {
        Some(context) => KubeClient::with_context(context).await?,
        None => KubeClient::new().await?,
    };
    let analysis = build_analysis(&args, config, Arc::new(client))?.with_cancel_token(cancel);
    render_analysis(analysis, &args).await
}

/// Assemble a run from command line flags layered over the configuration.
pub fn build_analysis(
    args: &AnalyzeArgs,
    config: &Config,
    client: Arc<dyn ClusterClient>,
) -> crate::Result<Analysis> {
    let cache = new_cache(&config.cache)?;
    if args.no_cache {
        cache.disable();
    }

    let language = args
        .language
        .clone()
        .unwrap_or_else(|| config.ai.language.clone());
    let max_concurrency = args
        .max_concurrency
        .unwrap_or(config.analysis.max_concurrency);

    let mut analysis = Analysis::new(client)
        .with_namespace(args.namespace.clone())
        .with_filters(args.filter.clone())
        .with_active_filters(config.active_filters.clone())
        .with_max_concurrency(max_concurrency)
        .with_language(language)
        .with_doc(args.with_doc || config.analysis.with_doc)
        .with_stats(args.with_stats)
        .with_registry(AnalyzerRegistry::from_config(config))
        .with_cache(cache);

    if args.explain {
        let mut ai = config.ai.clone();
        if let Some(backend) = &args.backend {
            ai.backend = backend.clone();
        }
        if args.model.is_some() {
            ai.model = args.model.clone();
        }
        analysis = analysis.with_backend(new_backend(&ai)?);
    }
    Ok(analysis)
}

/// Run the analysis, enrich it when requested and render it.
pub async fn render_analysis(mut analysis: Analysis, args: &AnalyzeArgs) -> crate::Result<String> {
    analysis.run_analysis().await;
    info!(
        "Analysis finished with {} results and {} errors",
        analysis.results.len(),
        analysis.errors.len()
    );

    if args.explain {
        analysis.get_ai_results(args.output, args.anonymize).await?;
    }

    let output = analysis.print_output(args.output)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}
