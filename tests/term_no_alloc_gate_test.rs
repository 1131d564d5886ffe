use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossterm::event::KeyCode;
use tui_engine::input::KeyboardState;
use tui_engine::snake::SnakeGame;
use tui_engine::term::{encode_diff_into, Cell, ColorMode, FrameBuffer};
use tui_engine::types::Color;

struct CountingAlloc;

static COUNT_ENABLED: AtomicBool = AtomicBool::new(false);
static ALLOC_COUNT: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.realloc(ptr, layout, new_size)
    }
}

fn with_alloc_counting<F: FnOnce()>(f: F) -> usize {
    ALLOC_COUNT.store(0, Ordering::Relaxed);
    COUNT_ENABLED.store(true, Ordering::Relaxed);
    f();
    COUNT_ENABLED.store(false, Ordering::Relaxed);
    ALLOC_COUNT.load(Ordering::Relaxed)
}

/// One frame's worth of engine-side work: draw the board, then encode the
/// diff into the reused output buffer.
fn draw_board(game: &SnakeGame, fb: &mut FrameBuffer) {
    fb.clear(Cell::default());
    if let Some(food) = game.food() {
        fb.plot(food.x * 2, food.y, Cell::new('(', Color::Red, Color::Black));
    }
    for p in game.body() {
        fb.plot(p.x * 2, p.y, Cell::new('#', Color::Green, Color::Black));
    }
}

#[test]
fn frame_draw_and_diff_encode_are_allocation_free_after_warmup() {
    let mut game = SnakeGame::new(30, 20, 7);
    let mut prev = FrameBuffer::new(60, 20);
    let mut next = FrameBuffer::new(60, 20);
    let mut out = Vec::with_capacity(64 * 1024);
    let mut keyboard = KeyboardState::new();

    // Warm-up.
    draw_board(&game, &mut next);
    encode_diff_into(&prev, &next, ColorMode::Named, &mut out).unwrap();
    std::mem::swap(&mut prev, &mut next);

    let allocs = with_alloc_counting(|| {
        for i in 0..200u32 {
            keyboard.press(if i % 2 == 0 { KeyCode::Up } else { KeyCode::Left });
            keyboard.update(16);
            keyboard.end_frame();

            if game.tick().is_none() {
                game.restart();
            }
            out.clear();
            draw_board(&game, &mut next);
            encode_diff_into(&prev, &next, ColorMode::Named, &mut out).unwrap();
            std::mem::swap(&mut prev, &mut next);
        }
    });

    assert_eq!(allocs, 0);
}
