//! Application Screens
//!
//! This example models the screens of a small game as a nested state tree.
//!
//! Key concepts:
//! - Nested states share context set up by their ancestors
//! - Leaving a screen leaves every nested screen first
//! - `jump` enters a deeply nested screen in one call
//! - Engine decisions are logged through `tracing`
//!
//! Run with: RUST_LOG=stategraph=debug cargo run --example screens

use stategraph::{signal, Config, Graph, Node};
use tracing_subscriber::EnvFilter;

fn path(chain: &[Node<String>]) -> String {
    chain
        .iter()
        .map(Node::name)
        .collect::<Vec<_>>()
        .join(" > ")
}

fn screen(graph: &Graph<String>, parents: &[&str], name: &str) -> Node<String> {
    let node = graph
        .define_at(parents.iter().copied(), name, |chain, args| {
            println!("  enter {} {:?}", path(chain), args);
        })
        .unwrap();
    node.on(signal::LEAVE, |chain, _| println!("  leave {}", path(chain)));
    node
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Application Screens Example ===\n");

    let graph = Graph::with_config(Config::builder().track_history(true).build());

    screen(&graph, &[], "menu");
    let options = screen(&graph, &["menu"], "options");
    screen(&graph, &["menu", "options"], "audio");
    let video = screen(&graph, &["menu", "options"], "video");
    screen(&graph, &[], "game");
    let paused = screen(&graph, &["game"], "paused");

    println!("Start at the menu:");
    graph.go("menu", vec![]).unwrap();

    println!("\nOpen the options:");
    options.jump(vec![]).unwrap();

    println!("\nJump straight into video settings:");
    video.jump(vec!["1920x1080".to_string()]).unwrap();

    println!("\nStart a game, then pause it:");
    graph.go("game", vec!["level-1".to_string()]).unwrap();
    paused.jump(vec!["escape pressed".to_string()]).unwrap();

    println!("\nGoing to the game again does nothing:");
    graph.go("game", vec![]).unwrap();

    println!("\nUnknown screens are reported, not entered:");
    if let Err(err) = graph.go("credits", vec![]) {
        println!("  [{}] {}", err.error_code(), err);
    }

    println!("\nQuit:");
    graph.end();

    println!("\nTop-level history:");
    for record in graph.history().transitions() {
        println!("  {:?} -> {:?}", record.from, record.to);
    }

    println!("\n=== Example Complete ===");
}
