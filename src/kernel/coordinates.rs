use geo::CoordsIter;

use crate::error::Result;
use crate::kernel::{KernelArgs, KernelOutput, NdArray, Values};
use crate::scalar::Geometry;

fn coords(geom: &Geometry) -> impl Iterator<Item = geo::Coord> + '_ {
    geom.as_geo()
        .coords_iter()
        .filter(|c| !(c.x.is_nan() && c.y.is_nan()))
}

/// Number of vertices per row. Empty geometries have none.
///
/// The result keeps the row labels; the buffer-wide total is the sum over this column.
pub fn count_coordinates(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = data
        .iter()
        .map(|geom| geom.as_ref().map(|geom| coords(geom).count() as i64))
        .collect();
    Ok(KernelOutput::Values(Values::Int64(NdArray::from_vec(values))))
}

/// Every vertex of every non-null geometry, as a `k x 2` array of `x, y`.
pub fn get_coordinates(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let mut values = vec![];
    for geom in data.iter().flatten() {
        for coord in coords(geom) {
            values.push(Some(coord.x));
            values.push(Some(coord.y));
        }
    }
    let rows = values.len() / 2;
    let values = NdArray::try_new(vec![rows, 2], values)?;
    Ok(KernelOutput::Values(Values::Float64(values)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::linestring::ls0;
    use crate::test::point::p2;

    #[test]
    fn count_and_get() {
        let data = vec![
            Some(Geometry::from(ls0())),
            None,
            Some(Geometry::empty_point()),
            Some(Geometry::from(p2())),
        ];
        let KernelOutput::Values(Values::Int64(counts)) =
            count_coordinates(&data, &KernelArgs::new()).unwrap()
        else {
            panic!("expected integers");
        };
        assert_eq!(counts.data(), &[Some(2), None, Some(0), Some(1)]);

        let KernelOutput::Values(Values::Float64(coords)) =
            get_coordinates(&data, &KernelArgs::new()).unwrap()
        else {
            panic!("expected floats");
        };
        assert_eq!(coords.shape(), &[3, 2]);
        assert_eq!(
            coords.data(),
            &[Some(0.), Some(0.), Some(3.), Some(4.), Some(2.), Some(3.)]
        );
    }
}
