use super::*;

#[test]
fn new_grid_is_empty() {
    let grid = GridStore::new(4);
    assert_eq!(grid.size(), 4);
    assert!(grid.is_empty());
    assert!(grid.get(0, 0).is_none());
    assert!(grid.snapshot().is_empty());
}

#[test]
fn set_then_get_returns_color_and_owner_everywhere() {
    let mut grid = GridStore::new(4);
    for x in 0..4 {
        for y in 0..4 {
            let color = u8::try_from((x + y) % 16).unwrap();
            grid.set(x, y, color, format!("user-{x}-{y}"));
            let pixel = grid.get(x, y).expect("pixel should be set");
            assert_eq!(pixel.color, color);
            assert_eq!(pixel.owner, format!("user-{x}-{y}"));
        }
    }
    assert_eq!(grid.len(), 16);
}

#[test]
fn second_placement_overwrites_in_place() {
    let mut grid = GridStore::new(4);
    grid.set(2, 3, 1, "alice");
    grid.set(2, 3, 9, "bob");

    assert_eq!(grid.len(), 1);
    let pixel = grid.get(2, 3).unwrap();
    assert_eq!(pixel, &Pixel { x: 2, y: 3, color: 9, owner: "bob".into() });
}

#[test]
fn snapshot_contains_exactly_the_set_pixels() {
    let mut grid = GridStore::new(8);
    grid.set(0, 0, 3, "a");
    grid.set(7, 7, 15, "b");
    grid.set(0, 0, 4, "c");

    let mut cells = grid.snapshot();
    cells.sort_by_key(|p| (p.x, p.y));
    assert_eq!(
        cells,
        vec![
            Pixel { x: 0, y: 0, color: 4, owner: "c".into() },
            Pixel { x: 7, y: 7, color: 15, owner: "b".into() },
        ]
    );
}

#[test]
fn snapshot_is_detached_from_later_writes() {
    let mut grid = GridStore::new(4);
    grid.set(1, 1, 2, "a");
    let before = grid.snapshot();
    grid.set(2, 2, 5, "a");

    assert_eq!(before.len(), 1);
    assert_eq!(grid.len(), 2);
}

#[test]
fn pixel_serializes_with_flat_fields() {
    let pixel = Pixel { x: 1, y: 2, color: 3, owner: "alice".into() };
    let json = serde_json::to_value(&pixel).unwrap();
    assert_eq!(json, serde_json::json!({"x": 1, "y": 2, "color": 3, "owner": "alice"}));
}
