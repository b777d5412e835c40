use glam::DVec2;

// Axis-aligned box in the track plane. Used for car footprints, checkpoint
// trigger regions and walls alike.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn from_vecs(min: DVec2, max: DVec2) -> BoundingBox {
        BoundingBox {
            min_x: min.x.min(max.x),
            max_x: min.x.max(max.x),
            min_y: min.y.min(max.y),
            max_y: min.y.max(max.y),
        }
    }

    pub fn from_center(center: DVec2, size: DVec2) -> BoundingBox {
        let half = size.abs() / 2.0;
        BoundingBox::from_vecs(center - half, center + half)
    }

    pub fn min(&self) -> DVec2 {
        DVec2::new(self.min_x, self.min_y)
    }

    pub fn max(&self) -> DVec2 {
        DVec2::new(self.max_x, self.max_y)
    }

    pub fn pos(&self) -> DVec2 {
        DVec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn is_colliding(&self, other: &BoundingBox) -> bool {
        (self.min_x <= other.max_x && self.max_x >= other.min_x)
            && (self.min_y <= other.max_y && self.max_y >= other.min_y)
    }

    // Fit this box around a width x length rectangle centered on pos and rotated
    // so that its length runs along `forward`
    pub fn set_dimensions(&mut self, pos: DVec2, size: DVec2, forward: DVec2) {
        let right = DVec2::new(forward.y, -forward.x);
        let half_width = size.x / 2.0;
        let half_length = size.y / 2.0;

        // symmetry! two adjacent corners are enough, the others are their negations
        let corners = [
            right * half_width + forward * half_length,
            right * -half_width + forward * half_length,
        ];

        let (mut x_dist, mut y_dist): (f64, f64) = (0.0, 0.0);
        for corner in corners {
            x_dist = x_dist.max(corner.x.abs());
            y_dist = y_dist.max(corner.y.abs());
        }

        self.min_x = pos.x - x_dist;
        self.max_x = pos.x + x_dist;
        self.min_y = pos.y - y_dist;
        self.max_y = pos.y + y_dist;
    }
}
