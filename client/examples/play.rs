use logicsweeper_client::{
    Action, ClientConfig, Difficulty, GameEvent, LogicGame, Pos, RevealState, Session,
    SessionStatus,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: r ROW COL | f ROW COL | hint | check | solve | new [easy|medium|hard] | quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ClientConfig::from_env();
    println!("Connecting to {}", config.server_url);
    let game = LogicGame::from_config(config)?;

    let mut event_receiver = game.subscribe_to_events().await;
    let event_handler = tokio::spawn(async move {
        while let Some(event) = event_receiver.recv().await {
            match event {
                GameEvent::SessionStarted {
                    rows,
                    cols,
                    mines_total,
                } => {
                    println!("🎮 New board: {}x{} with {} mines", rows, cols, mines_total);
                }
                GameEvent::StatusChanged { status } => match status {
                    SessionStatus::Won => println!("🎉 You won!"),
                    SessionStatus::Lost => println!("💣 Game over!"),
                    SessionStatus::Active => {}
                },
                _ => {}
            }
        }
    });

    report(&game, Action::NewSession(Difficulty::Easy)).await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        let action = match words.as_slice() {
            [] => continue,
            ["quit"] | ["q"] => break,
            ["r", row, col] | ["f", row, col] => {
                let (Ok(r), Ok(c)) = (row.parse::<usize>(), col.parse::<usize>()) else {
                    println!("{HELP}");
                    continue;
                };
                if words[0] == "r" {
                    Action::Reveal(Pos::new(r, c))
                } else {
                    Action::ToggleFlag(Pos::new(r, c))
                }
            }
            ["hint"] => Action::RequestHint,
            ["check"] => Action::CheckConsistency,
            ["solve"] => Action::AutoSolve,
            ["new"] => Action::NewSession(Difficulty::default()),
            ["new", level] => match level.parse::<Difficulty>() {
                Ok(difficulty) => Action::NewSession(difficulty),
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            },
            _ => {
                println!("{HELP}");
                continue;
            }
        };

        report(&game, action).await;
    }

    event_handler.abort();
    let _ = event_handler.await;

    Ok(())
}

async fn report(game: &LogicGame, action: Action) {
    match game.dispatch(action).await {
        Ok(notice) => println!("{notice}"),
        Err(e) => println!("{}", e.user_message()),
    }

    game.prune_flashes().await;
    if let Some(session) = game.get_state().await {
        display_board(&session);
    }
}

fn display_board(session: &Session) {
    let board = session.board();
    let counts = board.count_cells();
    println!(
        "Board ({}x{}, {} mines, {} flagged, {} hinted):",
        board.rows(),
        board.cols(),
        board.mines_total(),
        counts.flagged,
        session.overlay().hinted_count()
    );

    print!("    ");
    for c in 0..board.cols() {
        print!("{:>2}", c % 10);
    }
    println!();

    for r in 0..board.rows() {
        print!("  {:>2}", r);
        for c in 0..board.cols() {
            let pos = Pos::new(r, c);
            let Some(cell) = board.get(pos) else {
                continue;
            };
            let symbol = match cell.state {
                RevealState::Hidden if cell.flagged => "F".to_string(),
                RevealState::Hidden if session.overlay().is_hinted(pos) => "+".to_string(),
                RevealState::Hidden if session.overlay().suspected_mine() == Some(pos) => {
                    "!".to_string()
                }
                RevealState::Hidden => "·".to_string(),
                RevealState::Revealed { clue: 0 } => " ".to_string(),
                RevealState::Revealed { clue } => clue.to_string(),
                RevealState::Exploded => "X".to_string(),
                RevealState::Mine => "*".to_string(),
            };
            print!("{:>2}", symbol);
        }
        println!();
    }
}
