mod common;

use common::PlyBuilder;
use plysplat_io::{parse_to_splat_array, DecodeOptions, PlySplatReader, SplatReader};
use proptest::prelude::*;

fn finite() -> impl Strategy<Value = f64> {
    -8.0f64..8.0
}

proptest! {
    #[test]
    fn rotations_are_unit_length(rot in prop::array::uniform4(finite())) {
        prop_assume!(rot.iter().map(|v| v * v).sum::<f64>() > 1e-6);
        let row = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, rot[0], rot[1], rot[2], rot[3], 0.0, 0.0, 0.0, 0.0];
        let data = PlyBuilder::inria(0).row(&row).build();
        let splats = parse_to_splat_array(&data, &DecodeOptions::new()).unwrap();
        let q = splats.splat(0).unwrap().rotation;
        let norm = q.iter().map(|v| v * v).sum::<f32>().sqrt();
        prop_assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn scales_are_positive(scale in prop::array::uniform3(-20.0f64..20.0)) {
        let row = [0.0, 0.0, 0.0, scale[0], scale[1], scale[2], 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let data = PlyBuilder::inria(0).row(&row).build();
        let splats = parse_to_splat_array(&data, &DecodeOptions::new()).unwrap();
        prop_assert!(splats.splat(0).unwrap().scale.iter().all(|s| *s > 0.0));
    }

    #[test]
    fn packed_length_matches_layout(rows in 0usize..6, degree in 0u8..4) {
        let mut builder = PlyBuilder::inria(45);
        for r in 0..rows {
            let mut row = vec![r as f64; 59];
            row[9] = 1.0;
            builder = builder.row(&row);
        }
        let reader = PlySplatReader::from_bytes(builder.build()).unwrap();
        let packed = reader.read_packed(&DecodeOptions::new().with_sh_degree(degree)).unwrap();
        let stride = match degree.min(2) {
            0 => 44,
            1 => 80,
            _ => 140,
        };
        prop_assert_eq!(packed.len(), rows * stride);
    }
}
