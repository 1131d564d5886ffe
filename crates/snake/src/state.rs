//! Snake game state - movement, growth, food and speed-up
//!
//! Coordinates are grid cells with `(0, 0)` at the top left. The state is
//! pure and deterministic for a given seed, so it can be stepped in tests
//! without a terminal.

use std::collections::VecDeque;

use arrayvec::ArrayVec;

use crate::rng::SimpleRng;
use crate::types::{Direction, Point};

pub const MIN_WIDTH: u16 = 4;
pub const MIN_HEIGHT: u16 = 1;
pub const START_LENGTH: usize = 3;
/// Turns remembered between two steps.
pub const MAX_QUEUED_TURNS: usize = 2;
pub const BASE_STEP_INTERVAL_MS: u32 = 150;
pub const MIN_STEP_INTERVAL_MS: u32 = 60;
/// The step interval shrinks by this much every `FOODS_PER_LEVEL` foods.
pub const STEP_INTERVAL_DECREMENT_MS: u32 = 8;
pub const FOODS_PER_LEVEL: u32 = 5;
pub const POINTS_PER_LEVEL: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    Paused,
    GameOver,
    Won,
}

/// What a single step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Moved,
    Ate,
    Crashed,
    Won,
}

#[derive(Debug, Clone)]
pub struct SnakeGame {
    width: u16,
    height: u16,
    /// Head first.
    body: VecDeque<Point>,
    occupied: Vec<bool>,
    direction: Direction,
    turns: ArrayVec<Direction, MAX_QUEUED_TURNS>,
    food: Option<Point>,
    rng: SimpleRng,
    status: Status,
    score: u32,
    foods_eaten: u32,
    step_timer_ms: u32,
}

impl SnakeGame {
    /// New game on a `width x height` grid (raised to at least
    /// `MIN_WIDTH x MIN_HEIGHT`), snake in the middle heading right.
    pub fn new(width: u16, height: u16, seed: u32) -> Self {
        let width = width.max(MIN_WIDTH);
        let height = height.max(MIN_HEIGHT);
        let mut game = Self {
            width,
            height,
            body: VecDeque::with_capacity(width as usize * height as usize),
            occupied: vec![false; width as usize * height as usize],
            direction: Direction::Right,
            turns: ArrayVec::new(),
            food: None,
            rng: SimpleRng::new(seed),
            status: Status::Playing,
            score: 0,
            foods_eaten: 0,
            step_timer_ms: 0,
        };
        game.reset_board();
        game
    }

    fn reset_board(&mut self) {
        self.body.clear();
        self.occupied.fill(false);
        self.direction = Direction::Right;
        self.turns.clear();
        self.status = Status::Playing;
        self.score = 0;
        self.foods_eaten = 0;
        self.step_timer_ms = 0;

        let head_x = (self.width as i32 / 2).max(START_LENGTH as i32 - 1);
        let y = self.height as i32 / 2;
        for i in 0..START_LENGTH as i32 {
            let p = Point::new(head_x - i, y);
            self.body.push_back(p);
            self.mark(p, true);
        }
        self.spawn_food();
    }

    /// Start over on the same grid. The food sequence continues from the
    /// current generator state, so consecutive games differ.
    pub fn restart(&mut self) {
        self.reset_board();
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Starts at 1 and goes up every `FOODS_PER_LEVEL` foods. A food is
    /// worth `POINTS_PER_LEVEL` times the level it was eaten at.
    pub fn level(&self) -> u32 {
        1 + self.foods_eaten / FOODS_PER_LEVEL
    }

    pub fn foods_eaten(&self) -> u32 {
        self.foods_eaten
    }

    pub fn length(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    /// Body cells, head first.
    pub fn body(&self) -> impl Iterator<Item = Point> + '_ {
        self.body.iter().copied()
    }

    pub fn food(&self) -> Option<Point> {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_occupied(&self, p: Point) -> bool {
        self.index(p).is_some_and(|i| self.occupied[i])
    }

    pub fn step_interval_ms(&self) -> u32 {
        let levels = self.foods_eaten / FOODS_PER_LEVEL;
        BASE_STEP_INTERVAL_MS
            .saturating_sub(levels.saturating_mul(STEP_INTERVAL_DECREMENT_MS))
            .max(MIN_STEP_INTERVAL_MS)
    }

    /// Queue a turn for a coming step.
    ///
    /// Turns are checked against the last queued direction: repeating it or
    /// reversing into the body is ignored, as are turns beyond the queue
    /// limit. Returns whether the turn was queued.
    pub fn turn(&mut self, dir: Direction) -> bool {
        if self.status != Status::Playing {
            return false;
        }
        let last = self.turns.last().copied().unwrap_or(self.direction);
        if dir == last || dir == last.opposite() {
            return false;
        }
        self.turns.try_push(dir).is_ok()
    }

    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            Status::Playing => Status::Paused,
            Status::Paused => Status::Playing,
            other => other,
        };
    }

    /// Advance the step timer by `elapsed_ms` and step as often as it allows.
    ///
    /// Returns the most significant event of the steps taken.
    pub fn update(&mut self, elapsed_ms: u32) -> Option<StepEvent> {
        if self.status != Status::Playing {
            return None;
        }
        self.step_timer_ms = self.step_timer_ms.saturating_add(elapsed_ms);
        let mut result = None;
        while self.status == Status::Playing && self.step_timer_ms >= self.step_interval_ms() {
            self.step_timer_ms -= self.step_interval_ms();
            let event = self.tick();
            result = match (result, event) {
                (Some(StepEvent::Ate), Some(StepEvent::Moved)) => result,
                _ => event,
            };
        }
        result
    }

    /// Move one cell. Does nothing unless the game is playing.
    pub fn tick(&mut self) -> Option<StepEvent> {
        if self.status != Status::Playing {
            return None;
        }
        if !self.turns.is_empty() {
            self.direction = self.turns.remove(0);
        }

        let next = self.head().step(self.direction);
        if self.index(next).is_none() {
            self.status = Status::GameOver;
            return Some(StepEvent::Crashed);
        }

        let eats = self.food == Some(next);
        // Without food the tail moves away this step, so its cell is free.
        let into_tail = !eats && self.body.back() == Some(&next);
        if self.is_occupied(next) && !into_tail {
            self.status = Status::GameOver;
            return Some(StepEvent::Crashed);
        }
        if !eats {
            if let Some(tail) = self.body.pop_back() {
                self.mark(tail, false);
            }
        }
        self.body.push_front(next);
        self.mark(next, true);

        if !eats {
            return Some(StepEvent::Moved);
        }
        self.score += POINTS_PER_LEVEL * self.level();
        self.foods_eaten += 1;
        if self.spawn_food() {
            Some(StepEvent::Ate)
        } else {
            self.status = Status::Won;
            Some(StepEvent::Won)
        }
    }

    /// Place food on a random free cell. Returns false when the board is full.
    fn spawn_food(&mut self) -> bool {
        let free = self.occupied.len() - self.body.len();
        if free == 0 {
            self.food = None;
            return false;
        }
        let pick = self.rng.next_range(free as u32) as usize;
        let index = self
            .occupied
            .iter()
            .enumerate()
            .filter(|&(_, &taken)| !taken)
            .nth(pick)
            .map(|(i, _)| i);
        self.food = index.map(|i| {
            Point::new(
                (i % self.width as usize) as i32,
                (i / self.width as usize) as i32,
            )
        });
        self.food.is_some()
    }

    fn index(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x >= self.width as i32 || p.y >= self.height as i32 {
            return None;
        }
        Some(p.y as usize * self.width as usize + p.x as usize)
    }

    fn mark(&mut self, p: Point, taken: bool) {
        if let Some(i) = self.index(p) {
            self.occupied[i] = taken;
        }
    }

    #[cfg(test)]
    fn place_food(&mut self, p: Point) {
        self.food = Some(p);
    }

    #[cfg(test)]
    fn set_body(&mut self, cells: &[Point], direction: Direction) {
        self.body.clear();
        self.occupied.fill(false);
        for &p in cells {
            self.body.push_back(p);
            self.mark(p, true);
        }
        self.direction = direction;
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn starts_in_the_middle_heading_right() {
        let game = SnakeGame::new(20, 10, 1);
        assert_eq!(game.status(), Status::Playing);
        assert_eq!(game.length(), START_LENGTH);
        assert_eq!(game.head(), p(10, 5));
        assert_eq!(game.body().collect::<Vec<_>>(), vec![p(10, 5), p(9, 5), p(8, 5)]);
        let food = game.food().unwrap();
        assert!(!game.is_occupied(food));
    }

    #[test]
    fn tiny_grid_is_raised_to_minimum() {
        let game = SnakeGame::new(0, 0, 1);
        assert_eq!((game.width(), game.height()), (MIN_WIDTH, MIN_HEIGHT));
    }

    #[test]
    fn moves_one_cell_per_tick() {
        let mut game = SnakeGame::new(20, 10, 1);
        game.place_food(p(0, 0));
        assert_eq!(game.tick(), Some(StepEvent::Moved));
        assert_eq!(game.head(), p(11, 5));
        assert_eq!(game.length(), START_LENGTH);
        assert!(!game.is_occupied(p(8, 5)));
    }

    #[test]
    fn reversal_and_repeat_are_ignored() {
        let mut game = SnakeGame::new(20, 10, 1);
        assert!(!game.turn(Direction::Left));
        assert!(!game.turn(Direction::Right));
        assert!(game.turn(Direction::Up));
        // Checked against the queued Up, not the current Right.
        assert!(!game.turn(Direction::Down));
        assert!(game.turn(Direction::Left));
        assert!(!game.turn(Direction::Up), "queue holds two turns");
    }

    #[test]
    fn queued_turns_apply_one_per_tick() {
        let mut game = SnakeGame::new(20, 10, 1);
        game.place_food(p(0, 0));
        game.turn(Direction::Up);
        game.turn(Direction::Left);
        game.tick();
        assert_eq!(game.head(), p(10, 4));
        game.tick();
        assert_eq!(game.head(), p(9, 4));
        assert_eq!(game.direction(), Direction::Left);
    }

    #[test]
    fn wall_ends_the_game() {
        let mut game = SnakeGame::new(20, 10, 1);
        game.place_food(p(0, 0));
        game.set_body(&[p(19, 5), p(18, 5), p(17, 5)], Direction::Right);
        assert_eq!(game.tick(), Some(StepEvent::Crashed));
        assert_eq!(game.status(), Status::GameOver);
        assert_eq!(game.tick(), None);
    }

    #[test]
    fn running_into_the_body_ends_the_game() {
        let mut game = SnakeGame::new(20, 10, 1);
        game.place_food(p(0, 0));
        // Head at (5,5) heading down into (5,6), which is mid-body.
        game.set_body(
            &[p(5, 5), p(6, 5), p(6, 6), p(5, 6), p(4, 6)],
            Direction::Down,
        );
        assert_eq!(game.tick(), Some(StepEvent::Crashed));
    }

    #[test]
    fn may_follow_its_own_tail() {
        let mut game = SnakeGame::new(20, 10, 1);
        game.place_food(p(0, 0));
        // A 2x2 loop: the head enters the cell the tail is leaving.
        game.set_body(&[p(5, 5), p(6, 5), p(6, 6), p(5, 6)], Direction::Down);
        assert_eq!(game.tick(), Some(StepEvent::Moved));
        assert_eq!(game.head(), p(5, 6));
        assert_eq!(game.length(), 4);
        assert!(game.is_occupied(p(5, 6)));
    }

    #[test]
    fn eating_grows_and_scores_by_level() {
        let mut game = SnakeGame::new(20, 10, 1);
        game.place_food(p(11, 5));
        assert_eq!(game.tick(), Some(StepEvent::Ate));
        assert_eq!(game.length(), START_LENGTH + 1);
        assert_eq!(game.score(), 10);
        let food = game.food().unwrap();
        assert!(!game.is_occupied(food));

        for i in 0..4 {
            let head = game.head();
            game.place_food(p(head.x + 1, head.y));
            game.tick();
            assert_eq!(game.foods_eaten(), 2 + i);
        }
        assert_eq!(game.level(), 2);
        assert_eq!(game.score(), 50);
        game.place_food(p(game.head().x + 1, game.head().y));
        game.tick();
        assert_eq!(game.score(), 70);
    }

    #[test]
    fn speeds_up_every_five_foods_down_to_a_floor() {
        let mut game = SnakeGame::new(20, 10, 1);
        assert_eq!(game.step_interval_ms(), BASE_STEP_INTERVAL_MS);
        game.foods_eaten = 5;
        assert_eq!(game.step_interval_ms(), BASE_STEP_INTERVAL_MS - 8);
        game.foods_eaten = 9;
        assert_eq!(game.step_interval_ms(), BASE_STEP_INTERVAL_MS - 8);
        game.foods_eaten = 500;
        assert_eq!(game.step_interval_ms(), MIN_STEP_INTERVAL_MS);
    }

    #[test]
    fn filling_the_board_wins() {
        let mut game = SnakeGame::new(4, 1, 1);
        assert_eq!(game.food(), Some(p(3, 0)));
        assert_eq!(game.tick(), Some(StepEvent::Won));
        assert_eq!(game.status(), Status::Won);
        assert_eq!(game.food(), None);
        assert_eq!(game.length(), 4);
    }

    #[test]
    fn update_steps_on_the_interval() {
        let mut game = SnakeGame::new(20, 10, 1);
        game.place_food(p(0, 0));
        assert_eq!(game.update(BASE_STEP_INTERVAL_MS - 1), None);
        assert_eq!(game.update(1), Some(StepEvent::Moved));
        assert_eq!(game.head(), p(11, 5));
        game.update(BASE_STEP_INTERVAL_MS * 2);
        assert_eq!(game.head(), p(13, 5));
    }

    #[test]
    fn pause_freezes_the_snake() {
        let mut game = SnakeGame::new(20, 10, 1);
        game.toggle_pause();
        assert_eq!(game.status(), Status::Paused);
        assert_eq!(game.update(1000), None);
        assert!(!game.turn(Direction::Up));
        assert_eq!(game.head(), p(10, 5));
        game.toggle_pause();
        assert_eq!(game.status(), Status::Playing);
    }

    #[test]
    fn pause_does_not_revive_a_finished_game() {
        let mut game = SnakeGame::new(20, 10, 1);
        game.set_body(&[p(19, 5), p(18, 5), p(17, 5)], Direction::Right);
        game.tick();
        game.toggle_pause();
        assert_eq!(game.status(), Status::GameOver);
    }

    #[test]
    fn restart_resets_everything_but_the_rng() {
        let mut game = SnakeGame::new(20, 10, 1);
        game.place_food(p(11, 5));
        game.tick();
        game.set_body(&[p(19, 5), p(18, 5), p(17, 5)], Direction::Right);
        game.tick();
        assert_eq!(game.status(), Status::GameOver);

        game.restart();
        assert_eq!(game.status(), Status::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.length(), START_LENGTH);
        assert_eq!(game.head(), p(10, 5));
        assert_eq!(game.occupied.iter().filter(|&&t| t).count(), START_LENGTH);
        assert!(game.food().is_some());
    }

    #[test]
    fn same_seed_same_food() {
        let a = SnakeGame::new(30, 12, 99);
        let b = SnakeGame::new(30, 12, 99);
        assert_eq!(a.food(), b.food());
    }
}
