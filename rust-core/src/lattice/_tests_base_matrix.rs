#[cfg(test)]
mod _tests_base_matrix {
    use super::super::base_matrix::LatticeBasis;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn honeycomb() -> LatticeBasis {
        let s3 = 3f64.sqrt();
        LatticeBasis::from_vectors(
            &[vec![1.0, 0.0], vec![0.5, s3 / 2.0]],
            &[vec![0.0, 0.0], vec![0.5, s3 / 6.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_lower_dimensions_are_embedded() {
        let basis = LatticeBasis::from_vectors(&[vec![2.0]], &[vec![0.0]]).unwrap();
        assert_eq!(basis.dimension(), 1);
        assert_relative_eq!(basis.base_matrix()[(0, 0)], 2.0);
        assert_relative_eq!(basis.base_matrix()[(1, 1)], 1.0);
        assert_relative_eq!(basis.base_matrix()[(2, 2)], 1.0);
    }

    #[test]
    fn test_translation() {
        let basis = honeycomb();
        let t = basis.translation(&[1, 1]);
        assert_relative_eq!(t, Vector3::new(1.5, 3f64.sqrt() / 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_displacement_between_orbitals() {
        let basis = honeycomb();
        // B orbital of the same cell
        let dr = basis.displacement(&[0, 0], 0, &[0, 0], 1);
        assert_relative_eq!(dr, Vector3::new(0.5, 3f64.sqrt() / 6.0, 0.0), epsilon = 1e-12);

        // A orbital one cell back along a1, seen from B
        let dr = basis.displacement(&[0, 0], 1, &[-1, 0], 0);
        assert_relative_eq!(dr, Vector3::new(-1.5, -3f64.sqrt() / 6.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_dependent_vectors() {
        let result = LatticeBasis::from_vectors(&[vec![1.0, 0.0], vec![2.0, 0.0]], &[vec![0.0, 0.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_wrong_component_count() {
        let result = LatticeBasis::from_vectors(&[vec![1.0, 0.0], vec![0.0, 1.0]], &[vec![0.0]]);
        assert!(result.is_err());
        let result = LatticeBasis::from_vectors(&[vec![1.0, 0.0]], &[vec![0.0]]);
        assert!(result.is_err());
    }
}
