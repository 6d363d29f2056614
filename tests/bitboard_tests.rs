use broadside::{BitBoard, BitBoardError, Coordinate, GridMask};

#[test]
fn test_try_new_sizes() {
    // Success for board that fits
    let ok = BitBoard::<u64, 8>::try_new();
    assert!(ok.is_ok());

    // Failure when board is too large
    let err = BitBoard::<u8, 3>::try_new();
    assert!(matches!(err, Err(BitBoardError::SizeTooLarge { .. })));
}

#[test]
fn test_insert_reports_duplicates() {
    let mut bb = BitBoard::<u16, 4>::new();
    assert!(bb.is_empty());
    assert!(bb.insert(1, 1).unwrap());
    assert!(!bb.insert(1, 1).unwrap());
    assert_eq!(bb.count_ones(), 1);
    assert_eq!(
        bb.insert(4, 0),
        Err(BitBoardError::IndexOutOfBounds { row: 4, col: 0 })
    );
}

#[test]
fn test_grid_mask_coords() {
    let mut mask = GridMask::new();
    let a = Coordinate::from_key("J10").unwrap();
    let b = Coordinate::from_key("A2").unwrap();
    assert!(mask.insert_coord(a));
    assert!(mask.insert_coord(b));
    assert!(!mask.insert_coord(a));
    assert!(mask.contains(b));
    let coords: Vec<_> = mask.coords().collect();
    assert_eq!(coords, vec![b, a]);
}
