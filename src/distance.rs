/// A node position on the simulation plane.
pub type Point = [f64; 2];

#[must_use]
pub fn euclidean(a: &Point, b: &Point) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}
