//! Plinko headless runner
//!
//! Plays one round on the rapier engine, dropping disks across a fixed
//! column pattern, and prints the result. The browser build uses
//! `plinko::platform::web::WebGame` instead.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use anyhow::{Context, Result, bail, ensure};
    use clap::Parser;

    use plinko::consts::{BUCKET_COUNT, SIM_DT_MS};
    use plinko::physics::RapierWorld;
    use plinko::platform;
    use plinko::sim::{Game, GameEvent};
    use plinko::{HighScores, Initials, Tuning};

    #[derive(Parser, Debug)]
    #[command(name = "plinko", version, about = "Play a headless Plinko round")]
    struct Args {
        /// RNG seed (defaults to the clock)
        #[arg(long)]
        seed: Option<u64>,

        /// JSON file overriding any subset of the default tuning
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Drop columns, cycled until the round runs out of disks
        #[arg(long, value_delimiter = ',', default_values_t = vec![4usize, 1, 3, 5, 7, 2, 6, 0, 8])]
        columns: Vec<usize>,

        /// Simulated delay between drops
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,

        /// Give up if the round is still running after this much simulated time
        #[arg(long, default_value_t = 120_000)]
        max_ms: u64,

        /// Leaderboard tag for the final score
        #[arg(long, default_value = "CPU")]
        initials: String,
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading tuning file {}", path.display()))?;
        Tuning::from_json(&json).with_context(|| format!("parsing tuning file {}", path.display()))
    }

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Args::parse();

        ensure!(!args.columns.is_empty(), "at least one drop column is required");
        if let Some(&bad) = args.columns.iter().find(|&&c| c >= BUCKET_COUNT) {
            bail!("column {} is off the board (0..{})", bad, BUCKET_COUNT);
        }
        let initials = Initials::parse(&args.initials)
            .with_context(|| format!("bad initials {:?}", args.initials))?;
        let tuning = load_tuning(args.tuning.as_ref())?;
        let seed = args.seed.unwrap_or_else(platform::clock_seed);
        log::info!("Plinko (native) starting with seed: {}", seed);

        let world = RapierWorld::new(tuning.gravity);
        let mut game = Game::with_seed(world, tuning, seed);
        game.start_game();

        let mut columns = args.columns.iter().copied().cycle();
        let mut next_drop_ms = 0;
        let mut landed: BTreeMap<Option<usize>, u32> = BTreeMap::new();

        while !game.is_over() {
            if game.now_ms() >= args.max_ms {
                bail!("round still running after {} ms", args.max_ms);
            }
            if game.disks_remaining() > 0 && game.now_ms() >= next_drop_ms {
                if let Some(column) = columns.next() {
                    game.drop_disk(column);
                }
                next_drop_ms = game.now_ms() + args.interval_ms;
            }

            game.tick(SIM_DT_MS);
            for event in game.drain_events() {
                if let GameEvent::BucketScored { bucket, .. } = event {
                    *landed.entry(bucket).or_default() += 1;
                }
                log::info!("{}", serde_json::to_string(&event)?);
            }
        }

        let score = game.score();
        let mut high_scores = HighScores::new();
        let rank = high_scores.add_score(initials, score, platform::clock_ms());

        println!("Seed:     {}", seed);
        println!("Buckets:  {:?}", game.bucket_values());
        for (bucket, count) in &landed {
            match bucket {
                Some(index) => println!("  bucket {}: {} disk(s)", index, count),
                None => println!("  unknown bucket: {} disk(s)", count),
            }
        }
        println!("Score:    {}", score);
        match rank {
            Some(rank) => println!("Rank:     #{}", rank),
            None => println!("Rank:     unranked"),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::init, this is just to satisfy the compiler
}
