use serde_json::{Value, json};

use crate::model::{SheetLayout, Sprite};

fn meta(layout: &SheetLayout) -> Value {
    json!({
        "app": "sheetpack",
        "version": env!("CARGO_PKG_VERSION"),
        "format": "RGBA8888",
        "size": {"w": layout.size.width, "h": layout.size.height},
        "estimate": layout.estimate,
        "stats": &layout.stats,
    })
}

fn sprite_value(sprite: &Sprite) -> Value {
    match sprite.position {
        Some((x, y)) => json!({
            "id": sprite.id,
            "frame": {"x": x, "y": y, "w": sprite.width, "h": sprite.height},
            "placed": true,
        }),
        None => json!({
            "id": sprite.id,
            "frame": {"w": sprite.width, "h": sprite.height},
            "placed": false,
        }),
    }
}

/// Describes the sheet as `{ sprites: [...], unplaced, meta }`.
///
/// Sprites are listed by id. `keys[id]` becomes the sprite's `key`; missing
/// keys fall back to the id.
pub fn to_json<K: ToString>(layout: &SheetLayout, keys: &[K]) -> Value {
    let sprites: Vec<Value> = layout
        .sprites
        .iter()
        .map(|s| {
            let mut v = sprite_value(s);
            let key = keys.get(s.id).map_or_else(|| s.id.to_string(), K::to_string);
            v["key"] = Value::String(key);
            v
        })
        .collect();
    json!({
        "sprites": sprites,
        "unplaced": &layout.unplaced,
        "meta": meta(layout),
    })
}

/// Placed sprites keyed by name: `{ frames: { key: { frame, id } }, meta }`.
pub fn to_json_hash<K: ToString>(layout: &SheetLayout, keys: &[K]) -> Value {
    let mut frames = serde_json::Map::new();
    for sprite in layout.sprites.iter().filter(|s| s.is_placed()) {
        let key = keys
            .get(sprite.id)
            .map_or_else(|| sprite.id.to_string(), K::to_string);
        let mut v = sprite_value(sprite);
        if let Some(obj) = v.as_object_mut() {
            obj.remove("placed");
        }
        frames.insert(key, v);
    }
    json!({ "frames": frames, "meta": meta(layout) })
}
