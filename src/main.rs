#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use broadside::{
    cli::{
        blank_screen, describe_outcome, describe_result, handoff_screen, parse_placement,
        render_board, render_player_view,
    },
    connect_as_client, connect_as_host, init_logging, random_placements, validate_placement,
    NetConfig, NodeError, NodeUpdate, PeerNode, PlayerId, Session, ShipPlacement,
    TcpChannel, DEFAULT_PORT, SHIPS,
};

#[cfg(feature = "std")]
use clap::{Parser, Subcommand};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[arg(
        long,
        global = true,
        help = "Fix RNG seed for reproducible random fleets (e.g., --seed 12345)"
    )]
    seed: Option<u64>,
    #[arg(long, global = true, help = "Place every fleet at random without asking")]
    random: bool,
}

#[derive(Subcommand, Clone)]
#[cfg(feature = "std")]
enum Commands {
    /// Two players sharing this terminal.
    Hotseat,
    /// Host a networked game and wait for one opponent.
    Host {
        #[arg(long, default_value_t = format!("0.0.0.0:{}", DEFAULT_PORT))]
        bind: String,
        #[arg(long, help = "Give up waiting for a peer after this many seconds")]
        timeout: Option<u64>,
    },
    /// Join a game hosted by someone else.
    Join {
        #[arg(long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
        addr: String,
        #[arg(long, help = "Give up connecting after this many seconds")]
        timeout: Option<u64>,
    },
}

#[cfg(feature = "std")]
struct Console {
    lines: Lines<BufReader<Stdin>>,
}

#[cfg(feature = "std")]
impl Console {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Prompt and read one trimmed line. `None` once stdin is closed.
    async fn ask(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut rng = if let Some(s) = cli.seed {
        println!("Using fixed seed: {} (random fleets will be reproducible)", s);
        SmallRng::seed_from_u64(s)
    } else {
        let mut seed_rng = rand::rng();
        SmallRng::from_rng(&mut seed_rng)
    };
    let mut console = Console::new();

    match cli.command {
        Some(command) => run(command, &mut console, &mut rng, cli.random).await,
        None => menu(&mut console, &mut rng, cli.random).await,
    }
}

#[cfg(feature = "std")]
async fn menu(console: &mut Console, rng: &mut SmallRng, random: bool) -> anyhow::Result<()> {
    loop {
        println!("\n=== BROADSIDE ===");
        println!("  1) Hotseat");
        println!("  2) Host a game (port {})", DEFAULT_PORT);
        println!("  3) Join a game");
        println!("  4) Quit");
        let Some(choice) = console.ask("> ").await? else {
            return Ok(());
        };
        let command = match choice.as_str() {
            "1" => Commands::Hotseat,
            "2" => Commands::Host {
                bind: format!("0.0.0.0:{}", DEFAULT_PORT),
                timeout: None,
            },
            "3" => {
                let prompt = format!("Host address [127.0.0.1:{}]: ", DEFAULT_PORT);
                let Some(addr) = console.ask(&prompt).await? else {
                    return Ok(());
                };
                let addr = if addr.is_empty() {
                    format!("127.0.0.1:{}", DEFAULT_PORT)
                } else if addr.contains(':') {
                    addr
                } else {
                    format!("{}:{}", addr, DEFAULT_PORT)
                };
                Commands::Join { addr, timeout: Some(10) }
            }
            "4" | "q" | "quit" => return Ok(()),
            _ => {
                println!("Pick 1-4.");
                continue;
            }
        };
        if let Err(e) = run(command, console, rng, random).await {
            eprintln!("Game ended with an error: {}", e);
        }
    }
}

#[cfg(feature = "std")]
async fn run(
    command: Commands,
    console: &mut Console,
    rng: &mut SmallRng,
    random: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Hotseat => play_hotseat(console, rng, random).await,
        Commands::Host { bind, timeout } => {
            let config = net_config(timeout);
            println!("Waiting for an opponent on {}...", bind);
            match connect_as_host(bind.as_str(), &config).await {
                Ok((channel, peer)) => {
                    println!("Opponent connected from {}", peer);
                    play_networked(console, rng, random, channel, PlayerId::One).await
                }
                Err(e) => {
                    println!("Could not host: {}", e);
                    Ok(())
                }
            }
        }
        Commands::Join { addr, timeout } => {
            let config = net_config(timeout);
            println!("Connecting to {}...", addr);
            match connect_as_client(addr.as_str(), &config).await {
                Ok(channel) => {
                    println!("Connected successfully!");
                    play_networked(console, rng, random, channel, PlayerId::Two).await
                }
                Err(e) => {
                    println!("Could not join: {}", e);
                    Ok(())
                }
            }
        }
    }
}

#[cfg(feature = "std")]
fn net_config(timeout: Option<u64>) -> NetConfig {
    NetConfig {
        connect_timeout: timeout.map(Duration::from_secs),
        ..NetConfig::default()
    }
}

/// Ask for every ship in turn, or take a random fleet. `None` if stdin
/// closed.
#[cfg(feature = "std")]
async fn choose_fleet(
    console: &mut Console,
    rng: &mut SmallRng,
    random: bool,
) -> anyhow::Result<Option<Vec<ShipPlacement>>> {
    if random {
        return Ok(Some(random_placements(rng)));
    }
    println!("Place your ships as <anchor> <H|V>, e.g. A1 H. Press enter for a random fleet.");
    'fleet: loop {
        let mut candidates = Vec::with_capacity(SHIPS.len());
        for class in SHIPS {
            let candidate = loop {
                let prompt = format!("{} (length {}): ", class.name(), class.length());
                let Some(line) = console.ask(&prompt).await? else {
                    return Ok(None);
                };
                if line.is_empty() {
                    let fleet = random_placements(rng);
                    return Ok(Some(fleet));
                }
                match parse_placement(&line, class) {
                    Ok(candidate) => break candidate,
                    Err(e) => println!("Invalid input: {}", e),
                }
            };
            candidates.push(candidate);
        }
        match validate_placement(&candidates) {
            Ok(placement) => {
                println!("{}", render_board(&placement.board));
                return Ok(Some(candidates));
            }
            Err(e) => {
                println!("Fleet rejected: {}. Start again.", e);
                continue 'fleet;
            }
        }
    }
}

#[cfg(feature = "std")]
async fn play_hotseat(
    console: &mut Console,
    rng: &mut SmallRng,
    random: bool,
) -> anyhow::Result<()> {
    let mut session = Session::hotseat();
    for player in [PlayerId::One, PlayerId::Two] {
        println!("\n{}, place your fleet. {} look away!", player, player.other());
        let Some(candidates) = choose_fleet(console, rng, random).await? else {
            return Ok(());
        };
        session.submit_placement(player, &candidates)?;
        println!("{}", blank_screen());
    }

    while !session.is_game_over() {
        let player = session.active_player();
        if !hand_over(console, player).await? {
            return Ok(());
        }
        println!("\n=== {}'s turn ===", player);
        println!(
            "{}",
            render_player_view(session.board(player), &session.attack_view(player))
        );
        let outcome = loop {
            let Some(line) = console.ask("Target: ").await? else {
                return Ok(());
            };
            match session.attack(line.as_str()) {
                Ok(outcome) => break outcome,
                Err(e) => println!("{}", e),
            }
        };
        println!("{}", describe_outcome(&outcome));
        if !outcome.game_over && console.ask("Turn over. Press Enter.").await?.is_none() {
            return Ok(());
        }
    }

    if let Some(winner) = session.winner() {
        println!("\n=== GAME OVER ===\n{} has sunk the whole enemy fleet!", winner);
    }
    Ok(())
}

/// Hold the terminal on the hand-off screen until `next` is at the
/// keyboard. Returns `false` once input is closed.
#[cfg(feature = "std")]
async fn hand_over(console: &mut Console, next: PlayerId) -> anyhow::Result<bool> {
    Ok(console.ask(&format!("{} ", handoff_screen(next))).await?.is_some())
}

#[cfg(feature = "std")]
async fn play_networked(
    console: &mut Console,
    rng: &mut SmallRng,
    random: bool,
    channel: TcpChannel,
    local: PlayerId,
) -> anyhow::Result<()> {
    let (mut node, mut events) = PeerNode::start(channel, local);
    println!("You are {}. {} attacks first.", local, PlayerId::One);

    let Some(candidates) = choose_fleet(console, rng, random).await? else {
        return Ok(());
    };
    match node.submit_placement(&candidates).await {
        Ok(_) => println!("Fleet sent. Waiting for the opponent..."),
        Err(NodeError::Disconnected(e)) => {
            println!("Connection lost: {}. Returning to menu.", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    loop {
        if let Some(winner) = node.session().winner() {
            let session = node.session();
            println!(
                "{}",
                render_player_view(session.board(local), &session.attack_view(local))
            );
            if winner == local {
                println!("\n=== VICTORY ===\nYou have sunk all enemy ships!");
            } else {
                println!("\n=== DEFEAT ===\nAll your ships have been destroyed.");
            }
            return Ok(());
        }

        let event = if node.my_turn() {
            let session = node.session();
            println!(
                "{}",
                render_player_view(session.board(local), &session.attack_view(local))
            );
            tokio::select! {
                line = console.ask("Your target: ") => {
                    let Some(line) = line? else {
                        return Ok(());
                    };
                    match node.request_attack(line.as_str()).await {
                        Ok(target) => println!("Fired at {}...", target),
                        Err(NodeError::Disconnected(e)) => {
                            println!("Connection lost: {}. Returning to menu.", e);
                            return Ok(());
                        }
                        Err(e) => println!("{}", e),
                    }
                    continue;
                }
                event = events.recv() => event,
            }
        } else {
            events.recv().await
        };

        let Some(event) = event else {
            println!("Connection lost. Returning to menu.");
            return Ok(());
        };
        if !report(node.handle_event(event).await) {
            return Ok(());
        }
    }
}

/// Print what an event changed. `false` once the connection is gone.
#[cfg(feature = "std")]
fn report(update: NodeUpdate) -> bool {
    match update {
        NodeUpdate::Ignored => {}
        NodeUpdate::PeerReady => println!("Opponent fleet is ready."),
        NodeUpdate::BattleStarted => println!("Battle stations! {} fires first.", PlayerId::One),
        NodeUpdate::Defended(outcome) => {
            println!("Opponent fired at {}", describe_outcome(&outcome))
        }
        NodeUpdate::Resolved { target, result, .. } => {
            println!("{}", describe_result(target, result))
        }
        NodeUpdate::Disconnected(e) => {
            println!("Connection lost: {}. Returning to menu.", e);
            return false;
        }
    }
    true
}

