use std::path::PathBuf;

use anyhow::{Context, anyhow, bail};
use avatar::{ControllerConfig, ReplayScript};

#[derive(Debug, Clone)]
struct ReplayArgs {
    script: PathBuf,
    config: Option<PathBuf>,
    tick_seconds: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = parse_args()?;
    let mut script = ReplayScript::load_from_path(&args.script)
        .with_context(|| format!("failed to load replay script {}", args.script.display()))?;

    if let Some(path) = &args.config {
        script.config = ControllerConfig::load_from_path(path)
            .with_context(|| format!("failed to load controller config {}", path.display()))?;
    }
    if let Some(tick_seconds) = args.tick_seconds {
        script.tick_seconds = tick_seconds;
    }

    log::info!(
        "replaying {} step(s) at {:.4}s per tick",
        script.steps.len(),
        script.tick_seconds
    );

    for frame in script.run() {
        let position = frame.pose.position;
        log::info!(
            "step {:>3} tick {:>6} state={:<5} speed={:>7.3} pos=({:.3}, {:.3}, {:.3})",
            frame.step,
            frame.tick,
            frame.state.map_or("none", |state| state.name()),
            frame.forward_speed,
            position.x,
            position.y,
            position.z
        );
    }

    Ok(())
}

fn parse_args() -> anyhow::Result<ReplayArgs> {
    let mut script = None;
    let mut config = None;
    let mut tick_seconds = None;

    let mut args = std::env::args().skip(1).peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(next_arg_value(&mut args, &arg)?)),
            "--tick" => {
                let value = next_arg_value(&mut args, &arg)?;
                let parsed = value
                    .parse::<f32>()
                    .with_context(|| format!("invalid --tick value: {}", value))?;
                if !(parsed.is_finite() && parsed > 0.0) {
                    bail!("--tick must be a positive number of seconds");
                }
                tick_seconds = Some(parsed);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other if other.starts_with("--") => {
                bail!("unknown argument: {}\nUse --help to list options.", other);
            }
            path => {
                if script.replace(PathBuf::from(path)).is_some() {
                    bail!("only one replay script can be given");
                }
            }
        }
    }

    let script = script.ok_or_else(|| anyhow!("missing replay script path"))?;
    Ok(ReplayArgs {
        script,
        config,
        tick_seconds,
    })
}

fn next_arg_value<I>(args: &mut std::iter::Peekable<I>, flag: &str) -> anyhow::Result<String>
where
    I: Iterator<Item = String>,
{
    args.next()
        .ok_or_else(|| anyhow!("missing value for {}", flag))
}

fn print_help() {
    println!("avatar-replay <script.yaml> [--config controller.yaml] [--tick seconds]");
    println!();
    println!("Runs a scripted input timeline through the avatar controller and");
    println!("logs the animation state and pose at the end of every step.");
}
