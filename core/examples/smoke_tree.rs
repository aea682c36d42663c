use std::sync::Arc;

use ap_core::{CoreEngine, CoreOptions, MemoryStore};

fn main() -> Result<(), String> {
  let path = std::env::args()
    .nth(1)
    .ok_or_else(|| "usage: cargo run -p ap_core --example smoke_tree -- <file.json> [query]".to_string())?;
  let query = std::env::args().nth(2).unwrap_or_default();

  let text = std::fs::read_to_string(&path).map_err(|e| e.to_string())?;
  let doc: serde_json::Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;

  let eng = CoreEngine::with_store(CoreOptions::default(), Arc::new(MemoryStore::new()));
  eng.set_document(Some(doc));
  let pos = eng.set_query(&query);
  println!("matches={}", pos.total);
  if let Some(active) = eng.active_path() {
    println!("active={}", active);
  }

  for node in eng.render() {
    let marker = if node.kind.is_container() {
      if node.open { "-" } else { "+" }
    } else {
      " "
    };
    let flag = if node.active { ">" } else if node.matched { "*" } else { " " };
    println!(
      "{}{} {}{}: {}",
      flag,
      marker,
      "  ".repeat(node.depth),
      node.label,
      node.preview
    );
  }
  Ok(())
}
