//! PsycheFlow CLI - 认知周期交互演示

use std::io::{self, BufRead, Write};

use pf_core::{EnvironmentalContext, Query, QueryType};
use pf_decision::{CandidateOption, DecisionContext, DecisionEngine, DecisionOutcome, EngineConfig};
use pf_generators::GeneratorPool;
use pf_interference::{ActivitySnapshot, InterferenceEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pf=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("PsycheFlow CLI v0.1.0");
    println!("Type 'help' for available commands, 'quit' to exit.");
    println!();

    let mut pool = GeneratorPool::default_pool();
    let mut interference = InterferenceEngine::default_engine();
    let mut decision = DecisionEngine::new(EngineConfig::default());
    let ctx = EnvironmentalContext::default();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("pf> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (input, ""),
        };

        match command {
            "help" => {
                println!("Available commands:");
                println!("  help              - Show this help message");
                println!("  run <query>       - Run one cognitive cycle on a query");
                println!("  creative <query>  - Same, with the creative-task flag set");
                println!("  history           - Show recorded decisions");
                println!("  clear             - Clear the screen");
                println!("  quit / exit       - Exit the CLI");
            }
            "run" | "creative" => {
                if rest.is_empty() {
                    println!("Usage: {} <query text>", command);
                    continue;
                }
                let mut query = Query::new(rest, QueryType::CurrentSituation);
                if command == "creative" {
                    query = Query::new(rest, QueryType::CreativeExploration).creative();
                }
                if let Err(e) =
                    run_cycle(&mut pool, &mut interference, &mut decision, &query, &ctx).await
                {
                    println!("cycle failed: {}", e);
                }
            }
            "history" => {
                if decision.history().is_empty() {
                    println!("No decisions recorded yet.");
                }
                for record in decision.history() {
                    println!(
                        "  {} confidence={:.3} probability={:.3} at {}",
                        record.id, record.confidence, record.probability, record.decided_at
                    );
                }
            }
            "clear" => {
                print!("\x1B[2J\x1B[1;1H");
                stdout.flush()?;
            }
            "quit" | "exit" => {
                println!("Goodbye!");
                break;
            }
            _ => {
                println!("Unknown command: '{}'. Type 'help' for usage.", command);
            }
        }
    }

    Ok(())
}

/// 一次完整周期：生成器池 → 干涉引擎 → 决策坍缩
async fn run_cycle(
    pool: &mut GeneratorPool,
    interference: &mut InterferenceEngine,
    decision: &mut DecisionEngine,
    query: &Query,
    ctx: &EnvironmentalContext,
) -> anyhow::Result<()> {
    let pool_output = pool.process(query, ctx).await?;
    println!(
        "-- generator pool: {} active, coherence {:.3}",
        pool_output.results.len(),
        pool_output.coherence
    );
    println!("{}", serde_json::to_string_pretty(&pool_output)?);

    let snapshot = ActivitySnapshot {
        generator_activity: pool_output.activity_ratio(),
        coherence: pool_output.coherence,
        creative_task: query.creative_task,
    };
    let report = interference.calculate(&snapshot, ctx).await?;
    println!(
        "-- interference: {} patterns, noise level {:.3}",
        report.patterns.len(),
        report.noise_level
    );
    println!("{}", serde_json::to_string_pretty(&report.indices)?);

    // 每个生成器解读作为一个候选选项，置信度作先验权重
    let candidates: Vec<CandidateOption> = pool_output
        .results
        .iter()
        .map(|r| {
            let mut candidate = CandidateOption::new(serde_json::to_value(&r.noisy_output)?);
            candidate.prior_weight = Some(r.confidence);
            Ok(candidate)
        })
        .collect::<anyhow::Result<_>>()?;

    let mut request = DecisionContext::new(candidates);
    request.time_pressure = ctx.temporal.deadline_pressure;
    request.external_pressure = ctx.social.social_pressure;

    let outcome = decision.evaluate(&request, ctx).await?;
    match &outcome {
        DecisionOutcome::Collapsed(d) => {
            println!("-- decision collapsed (confidence {:.3})", d.confidence);
        }
        DecisionOutcome::Superposition(r) => {
            println!("-- superposition held: {}", r.recommendation);
        }
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
