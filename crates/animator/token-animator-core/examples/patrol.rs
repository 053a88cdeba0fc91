//! Walk a token around a square, pausing and resuming halfway, then stop it.
//!
//! Run with `RUST_LOG=token_animator=debug` to see the walker's lifecycle.

use std::sync::Arc;
use std::time::Duration;

use token_animator::{
    Animation, Animator, AnimatorError, Config, EntityId, Move, PathPoint, PlayOptions, Point,
    PositionSink,
};

struct ConsoleCanvas;

impl PositionSink for ConsoleCanvas {
    fn update_position(&self, entity: &EntityId, to: Point, mv: Move) -> Result<(), AnimatorError> {
        println!(
            "{entity} -> ({:>6.1}, {:>6.1}) {}",
            to.x,
            to.y,
            if mv.animate {
                format!("over {} ms", mv.duration.as_millis())
            } else {
                "instant".to_string()
            }
        );
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "token_animator=info".to_string());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let animator = Animator::new(Config::default(), Arc::new(ConsoleCanvas));
    let token = EntityId::from("goblin-1");
    let square = Animation::new(
        "square",
        [
            PathPoint::new(0.0, 0.0),
            PathPoint::new(100.0, 0.0),
            PathPoint::new(100.0, 100.0),
            PathPoint::new(0.0, 100.0),
            PathPoint::new(0.0, 0.0),
        ],
    );

    let run = {
        let animator = animator.clone();
        let token = token.clone();
        tokio::spawn(async move { animator.play(&token, &square, PlayOptions::with_speed(2.0)).await })
    };

    tokio::time::sleep(Duration::from_millis(150)).await;
    animator.pause(&token);
    println!("-- paused --");
    tokio::time::sleep(Duration::from_millis(300)).await;
    animator.resume(&token);
    println!("-- resumed --");
    tokio::time::sleep(Duration::from_millis(150)).await;
    animator.stop(&token).await;
    println!("-- stopped, playing: {} --", animator.is_playing(&token));

    let _ = run.await;
}
