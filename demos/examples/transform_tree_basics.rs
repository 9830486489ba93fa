// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform tree basics.
//!
//! Build a small hierarchy, move nodes, run the per-frame sync, and query world transforms.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p understory_demos --example transform_tree_basics`

use glam::{Quat, Vec3};
use understory_transform_tree::Tree;

fn main() {
    env_logger::init();

    // Build a small scene
    let mut tree = Tree::new();
    let root = tree.create_root("scene");
    let car = tree.create_node("car");
    let wheel = tree.create_node("wheel");
    let driver = tree.create_node("driver");
    tree.add_child(root, car);
    tree.add_child(car, wheel);
    tree.add_child(car, driver);

    tree.set_local_position(car, Vec3::new(10.0, 0.0, 0.0));
    tree.set_local_rotation(car, Quat::from_rotation_y(core::f32::consts::FRAC_PI_2));
    tree.set_local_position(wheel, Vec3::new(1.0, -0.5, 0.0));
    tree.set_local_position(driver, Vec3::new(0.0, 0.5, 0.0));

    log::info!("scene has {} nodes", tree.len());

    let stats = tree.sync_all();
    println!("first frame: {stats:?}");
    println!("wheel world position: {:?}", tree.position(wheel).unwrap());

    // Nothing changed: the whole scene is frozen.
    let stats = tree.sync_all();
    println!("idle frame: {stats:?}");
    assert_eq!(stats.visited, 0);

    // Drive forward; only the car's subtree is recomputed.
    tree.translate_local(car, Vec3::new(0.0, 0.0, -5.0));
    let stats = tree.sync_all();
    println!("after moving the car: {stats:?}");
    println!("wheel world position: {:?}", tree.position(wheel).unwrap());

    // The driver gets out but stays where they were.
    let before = tree.position(driver).unwrap();
    tree.add_child_and_save_transform(root, driver);
    let after = tree.position(driver).unwrap();
    println!("driver: {before:?} -> {after:?} (local {:?})", tree.local_position(driver).unwrap());
    assert!(before.abs_diff_eq(after, 1e-4));

    println!("path of wheel: {:?}", tree.path(wheel).unwrap());
    assert_eq!(tree.find_by_path(root, "car/wheel"), Some(wheel));
}
