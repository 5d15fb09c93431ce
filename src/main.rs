use anyhow::Result;
use clap::{Parser, ValueEnum};
use q_snake::game::GameConfig;
use q_snake::modes::{
    HumanMode, PlayConfig, PlayMode, ReplayMode, TrainConfig, TrainMode, WatchMode,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "q_snake")]
#[command(version, about = "Snake on a walled grid, learned with tabular Q-learning")]
struct Cli {
    /// What to run
    #[arg(long, default_value = "train")]
    mode: Mode,

    /// Grid width (playable cells)
    #[arg(long, default_value = "10")]
    width: usize,

    /// Grid height (playable cells)
    #[arg(long, default_value = "10")]
    height: usize,

    /// Episodes to train or play (train: 5000, play: 1)
    #[arg(long)]
    episodes: Option<usize>,

    /// Learned table to write (train) or read (play, watch)
    #[arg(long, default_value = "models/q_table.json")]
    table: PathBuf,

    /// Replay file to write (play) or read (replay)
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Episode of the replay file to start from
    #[arg(long)]
    replay_episode: Option<usize>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Learning rate
    #[arg(long)]
    alpha: Option<f64>,

    /// Discount factor
    #[arg(long)]
    gamma: Option<f64>,

    /// Repeats tolerated before the loop breaker steps in
    #[arg(long)]
    loop_threshold: Option<usize>,

    /// Log training progress every N episodes
    #[arg(long, default_value = "100")]
    log_frequency: usize,

    /// Save a training checkpoint every N episodes (0 disables)
    #[arg(long, default_value = "1000")]
    checkpoint_frequency: usize,

    /// Cap on steps per episode
    #[arg(long)]
    max_steps: Option<usize>,

    /// Print the final board of every played episode
    #[arg(long)]
    show_board: bool,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train a table and save it
    Train,
    /// Play greedy episodes headless and report final sizes
    Play,
    /// Watch the greedy agent in the terminal
    Watch,
    /// Play back a recorded replay file
    Replay,
    /// Play with the keyboard, one move per key
    Human,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let game_config = GameConfig::new(cli.width, cli.height);

    match cli.mode {
        Mode::Train => {
            let mut config = TrainConfig::new(cli.episodes.unwrap_or(5000), cli.table);
            config.game_config = game_config;
            config.seed = cli.seed;
            config.log_frequency = cli.log_frequency;
            config.checkpoint_frequency = cli.checkpoint_frequency;
            if cli.max_steps.is_some() {
                config.max_steps_per_episode = cli.max_steps;
            }
            if let Some(alpha) = cli.alpha {
                config.q_config.alpha = alpha;
            }
            if let Some(gamma) = cli.gamma {
                config.q_config.gamma = gamma;
            }
            if let Some(threshold) = cli.loop_threshold {
                config.q_config.loop_threshold = threshold;
            }

            let mut train_mode = TrainMode::new(config)?;
            train_mode.run()?;
        }
        Mode::Play => {
            let mut config = PlayConfig::new(cli.table);
            config.num_episodes = cli.episodes.unwrap_or(1);
            config.replay_path = cli.replay;
            config.loop_threshold = cli.loop_threshold;
            config.show_board = cli.show_board;
            config.seed = cli.seed;
            config.game_config = game_config;
            if cli.max_steps.is_some() {
                config.max_steps_per_episode = cli.max_steps;
            }

            let mut play_mode = PlayMode::new(config)?;
            play_mode.run()?;
        }
        Mode::Watch => {
            let mut watch_mode = WatchMode::new(&cli.table, game_config, cli.loop_threshold)?;
            watch_mode.run().await?;
        }
        Mode::Replay => {
            let path = cli
                .replay
                .unwrap_or_else(|| PathBuf::from("replays/replay.json"));
            let mut replay_mode = ReplayMode::new(&path, game_config, cli.replay_episode)?;
            replay_mode.run().await?;
        }
        Mode::Human => {
            let mut human_mode = HumanMode::new(game_config)?;
            human_mode.run().await?;
        }
    }

    Ok(())
}
