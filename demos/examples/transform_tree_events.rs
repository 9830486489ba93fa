// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchy events, enable propagation, tags, and scale compensation.
//!
//! Run:
//! - `cargo run -p understory_demos --example transform_tree_events`

use glam::{Quat, Vec3};
use understory_transform_tree::{HierarchyEvent, TagQuery, Tree};

fn main() {
    env_logger::init();

    let mut tree = Tree::new();
    tree.set_record_events(true);
    let root = tree.create_root("level");
    let group = tree.create_node("enemies");
    tree.add_child(root, group);
    for i in 0..3 {
        let enemy = tree.create_node("enemy");
        tree.set_local_position(enemy, Vec3::new(i as f32 * 2.0, 0.0, 0.0));
        let tags = tree.tags_mut(enemy).unwrap();
        tags.add("enemy");
        if i == 1 {
            tags.add("boss");
        }
        tree.add_child(group, enemy);
    }
    let _ = tree.take_events();

    // Disable the whole group and see who got deactivated.
    tree.set_enabled(group, false);
    for event in tree.take_events() {
        if let HierarchyEvent::HierarchyStateChanged { node, enabled } = event {
            println!("{} ({node:?}) enabled in hierarchy: {enabled}", tree.get(node).unwrap().name());
        }
    }
    tree.set_enabled(group, true);

    let bosses = tree.find_by_tag(root, &[TagQuery::All(&["enemy", "boss"])]);
    println!("bosses: {bosses:?}");
    assert_eq!(bosses.len(), 1);

    // A stretched group: the compensated health bar takes a clean axis-aligned scale
    // instead of a skewed world matrix.
    tree.set_local_scale(group, Vec3::new(4.0, 1.0, 1.0));
    tree.set_local_rotation(bosses[0], Quat::from_rotation_z(0.5));
    let bar = tree.create_node("health_bar");
    tree.set_scale_compensation(bar, true);
    tree.add_child(bosses[0], bar);
    println!("boss scale: {:?}", tree.scale(bosses[0]).unwrap());
    println!("health bar scale: {:?}", tree.scale(bar).unwrap());

    for event in tree.take_events() {
        println!("{event:?}");
    }
}
