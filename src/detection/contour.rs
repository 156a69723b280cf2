// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 轮廓几何工具模块
/// 实现类似于 cv2::moments / cv2::contourArea / cv2::minEnclosingCircle 的功能
use imageproc::geometry::convex_hull;
use imageproc::point::Point;

use super::types::Circle;

/// 面积为零的判定阈值
const AREA_EPS: f64 = 1e-9;

/// 轮廓多边形的空间矩 (格林公式)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// 面积加权质心, M00 为零时返回 None
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00.abs() < AREA_EPS {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// 计算闭合多边形的 0/1 阶矩
///
/// 顶点顺序 (顺/逆时针) 不影响结果, 符号统一为正面积
pub fn polygon_moments(points: &[Point<i32>]) -> Moments {
    if points.len() < 3 {
        return Moments::default();
    }

    let mut a = 0.0;
    let mut m10 = 0.0;
    let mut m01 = 0.0;
    // 相邻顶点 (末点连回首点)
    for (p, q) in points.iter().zip(points.iter().cycle().skip(1)) {
        let (xi, yi) = (p.x as f64, p.y as f64);
        let (xj, yj) = (q.x as f64, q.y as f64);

        let cross = xi * yj - xj * yi;
        a += cross;
        m10 += (xi + xj) * cross;
        m01 += (yi + yj) * cross;
    }

    let mut moments = Moments {
        m00: a / 2.0,
        m10: m10 / 6.0,
        m01: m01 / 6.0,
    };
    if moments.m00 < 0.0 {
        moments.m00 = -moments.m00;
        moments.m10 = -moments.m10;
        moments.m01 = -moments.m01;
    }
    moments
}

/// 轮廓面积 (鞋带公式)
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    polygon_moments(points).m00
}

/// 最小外接圆
///
/// 先求凸包再做增量构造, 凸包点数很少, 最坏情况也可接受
pub fn min_enclosing_circle(points: &[Point<i32>]) -> Option<Circle> {
    if points.is_empty() {
        return None;
    }

    let hull = convex_hull(points);
    let source = if hull.is_empty() { points } else { &hull[..] };
    let pts: Vec<(f64, f64)> = source.iter().map(|p| (p.x as f64, p.y as f64)).collect();

    let mut c = (pts[0].0, pts[0].1, 0.0);
    for (i, &p) in pts.iter().enumerate().skip(1) {
        if contains(c, p) {
            continue;
        }
        c = (p.0, p.1, 0.0);
        for (j, &q) in pts[..i].iter().enumerate() {
            if contains(c, q) {
                continue;
            }
            c = circle_from_two(p, q);
            for &r in &pts[..j] {
                if !contains(c, r) {
                    c = circle_from_three(p, q, r);
                }
            }
        }
    }

    Some(Circle {
        cx: c.0 as f32,
        cy: c.1 as f32,
        radius: c.2 as f32,
    })
}

#[inline]
fn contains(c: (f64, f64, f64), p: (f64, f64)) -> bool {
    let dx = p.0 - c.0;
    let dy = p.1 - c.1;
    (dx * dx + dy * dy).sqrt() <= c.2 + 1e-7
}

fn circle_from_two(a: (f64, f64), b: (f64, f64)) -> (f64, f64, f64) {
    let cx = (a.0 + b.0) / 2.0;
    let cy = (a.1 + b.1) / 2.0;
    let r = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt() / 2.0;
    (cx, cy, r)
}

fn circle_from_three(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> (f64, f64, f64) {
    let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
    if d.abs() < AREA_EPS {
        // 三点共线: 取最远两点
        let candidates = [circle_from_two(a, b), circle_from_two(a, c), circle_from_two(b, c)];
        return candidates
            .into_iter()
            .fold((0.0, 0.0, -1.0), |best, cand| if cand.2 > best.2 { cand } else { best });
    }

    let a2 = a.0 * a.0 + a.1 * a.1;
    let b2 = b.0 * b.0 + b.1 * b.1;
    let c2 = c.0 * c.0 + c.1 * c.1;
    let ux = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
    let uy = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;
    let r = ((a.0 - ux).powi(2) + (a.1 - uy).powi(2)).sqrt();
    (ux, uy, r)
}
