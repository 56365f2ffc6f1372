use anyhow::Result;
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdin, stdout, Write};

use mnk_ai::agent::MinimaxAgent;
use mnk_ai::board::{Board, Player};
use mnk_ai::{COLUMNS, ROWS, WIN_CONDITION_LENGTH};

fn main() -> Result<()> {
    let mut board = Board::new();

    let stdin = stdin();

    println!(
        "Welcome to {}-in-a-row on a {}x{} board\n",
        WIN_CONDITION_LENGTH, ROWS, COLUMNS
    );

    let mut ai_players = (false, false);

    // choose AI control of player X
    loop {
        let mut buffer = String::new();
        print!("Is player {} AI controlled? y/n: ", Player::A.mark());
        stdout().flush().expect("failed to flush to stdout!");
        stdin.read_line(&mut buffer)?;
        match buffer.to_lowercase().chars().next() {
            Some(_letter @ 'y') => {
                ai_players.0 = true;
                break;
            }
            Some(_letter @ 'n') => break,
            _ => println!("Unknown answer given"),
        }
    }

    // choose AI control of player O
    loop {
        let mut buffer = String::new();
        print!("Is player {} AI controlled? y/n: ", Player::B.mark());
        stdout().flush().expect("failed to flush to stdout!");
        stdin.read_line(&mut buffer)?;
        match buffer.to_lowercase().chars().next() {
            Some(_letter @ 'y') => {
                ai_players.1 = true;
                break;
            }
            Some(_letter @ 'n') => break,
            _ => println!("Unknown answer given"),
        }
    }

    // game loop
    loop {
        display(&board).expect("Failed to draw board!");

        if board.is_game_over() {
            match board.winner() {
                Some(player) => println!("Player {} wins!", player.mark()),
                None => println!("It's a draw!"),
            }
            break;
        }

        let ai_turn = match board.turn() {
            Player::A => ai_players.0,
            Player::B => ai_players.1,
        };

        let next_move =
            // AI player
            if ai_turn {
                println!("AI is thinking...");
                stdout().flush().expect("Failed to flush to stdout!");

                // slow down play if both players are AI
                if ai_players == (true, true) {
                    std::thread::sleep(std::time::Duration::new(1, 0));
                }

                let index = MinimaxAgent::select_move_iterative(&board, (ROWS * COLUMNS) as u32)?;
                println!("AI plays ({}, {})", index % COLUMNS, index / COLUMNS);
                index

            // human player
            } else {
                print!("Coordinates of move (x y) > ");
                stdout().flush().expect("Failed to flush to stdout!");
                let mut input_str = String::new();
                stdin.read_line(&mut input_str)?;

                let mut coords = input_str.split_whitespace().map(|part| part.parse::<usize>());
                let (x, y) = match (coords.next(), coords.next()) {
                    (Some(Ok(x)), Some(Ok(y))) => (x, y),
                    _ => {
                        println!("Could not parse coordinates: {}", input_str.trim());
                        continue;
                    }
                };

                if x >= COLUMNS || y >= ROWS {
                    println!(
                        "Invalid move, x must be below {} and y below {}",
                        COLUMNS, ROWS
                    );
                    continue;
                }
                let index = y * COLUMNS + x;
                if !board.is_blank(index) {
                    println!("Invalid move, the selected cell must be blank");
                    continue;
                }
                index
            };

        board.apply_move(next_move);
    }
    Ok(())
}

fn display(board: &Board) -> Result<()> {
    let mut stdout = stdout();

    stdout.queue(PrintStyledContent(style("\n  ".to_string())))?;
    for x in 0..COLUMNS {
        stdout.queue(PrintStyledContent(style(format!("{} ", x))))?;
    }
    stdout.queue(PrintStyledContent(style("\n".to_string())))?;

    for y in 0..ROWS {
        stdout.queue(PrintStyledContent(style(format!("{} ", y))))?;
        for x in 0..COLUMNS {
            let cell = match board.at(y, x) {
                Some(Player::A) => style("X ".to_string())
                    .attribute(Attribute::Bold)
                    .with(Color::Red),
                Some(Player::B) => style("O ".to_string())
                    .attribute(Attribute::Bold)
                    .with(Color::Yellow),
                None => style("- ".to_string()).with(Color::DarkGrey),
            };
            stdout.queue(PrintStyledContent(cell))?;
        }
        stdout.queue(PrintStyledContent(style("\n".to_string())))?;
    }
    stdout.flush()?;
    Ok(())
}
