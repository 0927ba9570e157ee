use glam::IVec3;

pub const MAP_WIDTH: i64 = 512;
pub const MAP_DEPTH: i64 = 64;
/// Longest line a BlockLine packet may build.
pub const MAX_LINE_LENGTH: usize = 50;

/// Voxel cells on the line from `from` to `to`, both inclusive.
///
/// Fixed-point walk: each axis advances when its accumulated distance is the
/// smallest. Stops after `max_len` cells or when the next step would leave the
/// map.
pub fn cube_line(from: IVec3, to: IVec3, max_len: usize) -> Vec<IVec3> {
    let mut cells = Vec::new();
    if max_len == 0 {
        return cells;
    }

    let d = to.as_i64vec3() - from.as_i64vec3();
    let step = |v: i64| if v < 0 { -1i64 } else { 1 };
    let (ixi, iyi, izi) = (step(d.x), step(d.y), step(d.z));

    let flat = 0x3fff_ffff / MAP_WIDTH;
    let ratio = |major: i64, minor: i64| {
        if minor == 0 {
            flat
        } else {
            (major * 1024 / minor).abs()
        }
    };

    let (dxi, dyi, dzi);
    if d.x.abs() >= d.y.abs() && d.x.abs() >= d.z.abs() {
        dxi = 1024;
        dyi = ratio(d.x, d.y);
        dzi = ratio(d.x, d.z);
    } else if d.y.abs() >= d.z.abs() {
        dyi = 1024;
        dxi = ratio(d.y, d.x);
        dzi = ratio(d.y, d.z);
    } else {
        dzi = 1024;
        dxi = ratio(d.z, d.x);
        dyi = ratio(d.z, d.y);
    }

    let (mut dx, mut dy, mut dz) = (dxi / 2, dyi / 2, dzi / 2);
    if ixi >= 0 {
        dx = dxi - dx;
    }
    if iyi >= 0 {
        dy = dyi - dy;
    }
    if izi >= 0 {
        dz = dzi - dz;
    }

    let mut c = from.as_i64vec3();
    let end = to.as_i64vec3();
    loop {
        cells.push(IVec3::new(c.x as i32, c.y as i32, c.z as i32));
        if cells.len() == max_len || c == end {
            break;
        }

        if dz <= dx && dz <= dy {
            c.z += izi;
            if c.z < 0 || c.z >= MAP_DEPTH {
                break;
            }
            dz += dzi;
        } else if dx < dy {
            c.x += ixi;
            if c.x < 0 || c.x >= MAP_WIDTH {
                break;
            }
            dx += dxi;
        } else {
            c.y += iyi;
            if c.y < 0 || c.y >= MAP_WIDTH {
                break;
            }
            dy += dyi;
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_along_x() {
        let cells = cube_line(IVec3::new(10, 10, 10), IVec3::new(14, 10, 10), MAX_LINE_LENGTH);
        let xs: Vec<i32> = cells.iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![10, 11, 12, 13, 14]);
        assert!(cells.iter().all(|c| c.y == 10 && c.z == 10));
    }

    #[test]
    fn single_cell() {
        let p = IVec3::new(3, 4, 5);
        assert_eq!(cube_line(p, p, MAX_LINE_LENGTH), vec![p]);
    }

    #[test]
    fn cells_are_face_connected() {
        let cells = cube_line(IVec3::new(0, 0, 0), IVec3::new(7, 3, 5), MAX_LINE_LENGTH);
        assert_eq!(cells.first(), Some(&IVec3::ZERO));
        assert_eq!(cells.last(), Some(&IVec3::new(7, 3, 5)));
        for pair in cells.windows(2) {
            let diff = (pair[1] - pair[0]).abs();
            assert_eq!(diff.x + diff.y + diff.z, 1);
        }
    }

    #[test]
    fn length_is_capped() {
        let cells = cube_line(IVec3::new(0, 0, 0), IVec3::new(200, 0, 0), MAX_LINE_LENGTH);
        assert_eq!(cells.len(), MAX_LINE_LENGTH);
    }

    #[test]
    fn extreme_coordinates() {
        let cells = cube_line(IVec3::splat(i32::MIN), IVec3::splat(i32::MAX), MAX_LINE_LENGTH);
        assert_eq!(cells, vec![IVec3::splat(i32::MIN)]);
    }

    #[test]
    fn stops_at_map_floor() {
        let cells = cube_line(IVec3::new(5, 5, 62), IVec3::new(5, 5, 70), MAX_LINE_LENGTH);
        assert_eq!(cells.last(), Some(&IVec3::new(5, 5, 63)));
    }
}
