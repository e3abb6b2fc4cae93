use crate::{
    car::{Car, Corner},
    street::Street,
};
use glam::DVec2;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParkedCar {
    Rear,
    Front,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collision {
    ParkedCar { car: ParkedCar, corner: Corner },
    /// The street-side corner of a parked car entered the moving car.
    ParkedCorner(ParkedCar),
    Kerb(Corner),
    Canvas(Corner),
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collision::ParkedCar { car, corner } => {
                write!(f, "{corner:?} corner hit the {car:?} parked car")
            }
            Collision::ParkedCorner(car) => write!(f, "{car:?} parked car corner entered the body"),
            Collision::Kerb(corner) => write!(f, "{corner:?} corner crossed the kerb"),
            Collision::Canvas(corner) => write!(f, "{corner:?} corner left the canvas"),
        }
    }
}

pub fn check_collision(car: &Car, street: &Street) -> bool {
    find_collision(car, street).is_some()
}

/// First collision found, testing the car's corners before the parked
/// cars' outer corners.
pub fn find_collision(car: &Car, street: &Street) -> Option<Collision> {
    let canvas = street.canvas();

    for (corner, point) in car.corners() {
        if street.rear_car().contains(point) {
            return Some(Collision::ParkedCar {
                car: ParkedCar::Rear,
                corner,
            });
        }
        if street.front_car().contains(point) {
            return Some(Collision::ParkedCar {
                car: ParkedCar::Front,
                corner,
            });
        }
        if point.y > street.kerb_y() {
            return Some(Collision::Kerb(corner));
        }
        if !within(point, canvas.origin, canvas.origin + canvas.size) {
            return Some(Collision::Canvas(corner));
        }
    }

    [
        (ParkedCar::Rear, street.rear_outer_corner()),
        (ParkedCar::Front, street.front_outer_corner()),
    ]
    .into_iter()
    .find(|&(_, point)| car.contains(point))
    .map(|(parked, _)| Collision::ParkedCorner(parked))
}

fn within(point: DVec2, min: DVec2, max: DVec2) -> bool {
    point.cmpge(min).all() && point.cmple(max).all()
}
