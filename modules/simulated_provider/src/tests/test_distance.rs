// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::distance_m;
use common::position::Position;

#[test]
fn distance_to_same_point_is_zero() {
    let pos = Position::new(52.026649, 11.282535);
    assert_eq!(distance_m(&pos, &pos), 0.0);
}

#[test]
fn distance_of_one_degree_latitude() {
    let distance = distance_m(&Position::new(52.0, 11.0), &Position::new(53.0, 11.0));
    assert!((distance - 111_195.0).abs() < 10.0, "distance was {distance}");
}

#[test]
fn distance_between_route_points() {
    let distance = distance_m(
        &Position::new(52.026649, 11.282535),
        &Position::new(52.026751, 11.282047),
    );
    assert!((30.0..40.0).contains(&distance), "distance was {distance}");
}
