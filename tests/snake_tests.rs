//! Integration tests for the Snake rules through the public API

use tui_engine::snake::{SnakeGame, Status, StepEvent};
use tui_engine::types::{Direction, Point};

/// Greedy autopilot: head for the food, avoiding walls and the body.
fn chase_food(game: &mut SnakeGame) -> Option<StepEvent> {
    let food = game.food()?;
    let head = game.head();

    let mut options = Vec::with_capacity(8);
    if food.x > head.x {
        options.push(Direction::Right);
    }
    if food.x < head.x {
        options.push(Direction::Left);
    }
    if food.y > head.y {
        options.push(Direction::Down);
    }
    if food.y < head.y {
        options.push(Direction::Up);
    }
    options.extend([Direction::Up, Direction::Down, Direction::Left, Direction::Right]);

    let (w, h) = (game.width() as i32, game.height() as i32);
    let safe = options.into_iter().find(|&dir| {
        let next = head.step(dir);
        dir != game.direction().opposite()
            && (0..w).contains(&next.x)
            && (0..h).contains(&next.y)
            && !game.is_occupied(next)
    });
    if let Some(dir) = safe {
        game.turn(dir);
    }
    game.tick()
}

#[test]
fn test_same_seed_same_game() {
    let mut a = SnakeGame::new(24, 12, 2024);
    let mut b = SnakeGame::new(24, 12, 2024);
    for _ in 0..40 {
        assert_eq!(chase_food(&mut a), chase_food(&mut b));
        assert_eq!(a.food(), b.food());
        assert_eq!(a.head(), b.head());
    }
}

#[test]
fn test_eating_grows_scores_and_respawns_food() {
    let mut game = SnakeGame::new(24, 12, 5);
    let mut eaten = 0;
    for _ in 0..500 {
        match chase_food(&mut game) {
            Some(StepEvent::Ate) => eaten += 1,
            Some(StepEvent::Moved) => {}
            other => panic!("unexpected {other:?} at length {}", game.length()),
        }
        if eaten == 3 {
            break;
        }
    }
    assert_eq!(eaten, 3);
    assert_eq!(game.length(), 6);
    assert_eq!(game.score(), 30);
    let food = game.food().unwrap();
    assert!(!game.body().any(|p| p == food));
}

#[test]
fn test_body_cells_stay_connected() {
    let mut game = SnakeGame::new(24, 12, 9);
    for _ in 0..60 {
        if chase_food(&mut game) == Some(StepEvent::Crashed) {
            break;
        }
        let body: Vec<Point> = game.body().collect();
        for pair in body.windows(2) {
            let d = pair[0] - pair[1];
            assert_eq!(d.x.abs() + d.y.abs(), 1, "gap between {:?}", pair);
        }
    }
}

#[test]
fn test_wall_crash_then_restart() {
    // Never steering: the snake runs straight into the right wall.
    let mut game = SnakeGame::new(10, 5, 1);
    for _ in 0..20 {
        if game.tick() == Some(StepEvent::Crashed) {
            break;
        }
    }
    assert_eq!(game.status(), Status::GameOver);
    assert_eq!(game.tick(), None);

    game.restart();
    assert_eq!(game.status(), Status::Playing);
    assert_eq!(game.length(), 3);
    assert_eq!(game.score(), 0);
}
