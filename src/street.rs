use glam::DVec2;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    Parallel,
    Bay,
}

/// Street description. Millimetres in configuration files, canvas units once
/// [`StreetParams::scaled`] has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StreetParams {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub kerb_y: f64,
    pub rear_car_x: f64,
    pub rear_car_length: f64,
    pub rear_car_width: f64,
    pub front_car_length: f64,
    pub front_car_width: f64,
    pub car_from_kerb: f64,
    pub safety_gap: f64,
    /// Externally fixed distance between the two parked cars.
    pub parking_space: Option<f64>,
}

impl Default for StreetParams {
    fn default() -> Self {
        Self {
            canvas_width: 24000.0,
            canvas_height: 12000.0,
            kerb_y: 11000.0,
            rear_car_x: 1000.0,
            rear_car_length: 4800.0,
            rear_car_width: 1904.0,
            front_car_length: 4800.0,
            front_car_width: 1904.0,
            car_from_kerb: 250.0,
            safety_gap: 250.0,
            parking_space: None,
        }
    }
}

impl StreetParams {
    pub fn scaled(&self, scale: f64) -> Self {
        let Self {
            canvas_width,
            canvas_height,
            kerb_y,
            rear_car_x,
            rear_car_length,
            rear_car_width,
            front_car_length,
            front_car_width,
            car_from_kerb,
            safety_gap,
            parking_space,
        } = *self;

        Self {
            canvas_width: canvas_width / scale,
            canvas_height: canvas_height / scale,
            kerb_y: kerb_y / scale,
            rear_car_x: rear_car_x / scale,
            rear_car_length: rear_car_length / scale,
            rear_car_width: rear_car_width / scale,
            front_car_length: front_car_length / scale,
            front_car_width: front_car_width / scale,
            car_from_kerb: car_from_kerb / scale,
            safety_gap: safety_gap / scale,
            parking_space: parking_space.map(|space| space / scale),
        }
    }

    /// Extent of the front car measured away from the kerb.
    pub fn front_car_depth(&self, layout: Layout) -> f64 {
        match layout {
            Layout::Parallel => self.front_car_width,
            Layout::Bay => self.front_car_length,
        }
    }

    /// Y of the pivot point, which does not depend on the space length.
    pub fn pivot_y(&self, layout: Layout) -> f64 {
        self.kerb_y - self.car_from_kerb - self.front_car_depth(layout) - self.safety_gap
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: DVec2,
    pub size: DVec2,
}

impl Rect {
    pub fn new(origin: DVec2, size: DVec2) -> Self {
        Self { origin, size }
    }

    pub fn left(&self) -> f64 {
        self.origin.x
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.x
    }

    pub fn top(&self) -> f64 {
        self.origin.y
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.y
    }

    pub fn contains(&self, point: DVec2) -> bool {
        point.x > self.left() && point.x < self.right() && point.y > self.top() && point.y < self.bottom()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Street {
    layout: Layout,
    canvas: Rect,
    kerb_y: f64,
    rear_car: Rect,
    front_car: Rect,
    car_from_kerb: f64,
    safety_gap: f64,
    space: f64,
}

impl Street {
    pub fn new(params: &StreetParams, layout: Layout, space: f64) -> Self {
        let StreetParams {
            canvas_width,
            canvas_height,
            kerb_y,
            rear_car_x,
            rear_car_length,
            rear_car_width,
            front_car_length,
            front_car_width,
            car_from_kerb,
            safety_gap,
            ..
        } = *params;

        let (rear_size, front_size) = match layout {
            Layout::Parallel => (
                DVec2::new(rear_car_length, rear_car_width),
                DVec2::new(front_car_length, front_car_width),
            ),
            Layout::Bay => (
                DVec2::new(rear_car_width, rear_car_length),
                DVec2::new(front_car_width, front_car_length),
            ),
        };
        let parked_bottom = kerb_y - car_from_kerb;
        let rear_car = Rect::new(
            DVec2::new(rear_car_x, parked_bottom - rear_size.y),
            rear_size,
        );
        let front_car = Rect::new(
            DVec2::new(rear_car.right() + space, parked_bottom - front_size.y),
            front_size,
        );

        Self {
            layout,
            canvas: Rect::new(DVec2::ZERO, DVec2::new(canvas_width, canvas_height)),
            kerb_y,
            rear_car,
            front_car,
            car_from_kerb,
            safety_gap,
            space,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn canvas(&self) -> &Rect {
        &self.canvas
    }

    pub fn kerb_y(&self) -> f64 {
        self.kerb_y
    }

    pub fn rear_car(&self) -> &Rect {
        &self.rear_car
    }

    pub fn front_car(&self) -> &Rect {
        &self.front_car
    }

    pub fn car_from_kerb(&self) -> f64 {
        self.car_from_kerb
    }

    pub fn safety_gap(&self) -> f64 {
        self.safety_gap
    }

    pub fn space(&self) -> f64 {
        self.space
    }

    pub fn rear_outer_corner(&self) -> DVec2 {
        DVec2::new(self.rear_car.right(), self.rear_car.top())
    }

    pub fn front_outer_corner(&self) -> DVec2 {
        DVec2::new(self.front_car.left(), self.front_car.top())
    }

    pub fn pivot_point(&self) -> DVec2 {
        self.front_outer_corner() - DVec2::splat(self.safety_gap)
    }

    pub fn rear_limit_x(&self) -> f64 {
        self.rear_outer_corner().x + self.safety_gap
    }

    pub fn distance_to_kerb(&self, y: f64) -> f64 {
        self.kerb_y - y
    }
}
