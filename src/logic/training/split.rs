//! Deterministic Train/Validation Split
//!
//! Seeded, stratified: each class is shuffled separately and contributes a
//! proportional tail to the validation set, so a validation split drawn from
//! a two-class dataset always contains both classes (which the calibrators
//! require). The same seed and data always produce the same split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug)]
pub struct DataSplit {
    pub train_x: Vec<Vec<f64>>,
    pub train_y: Vec<u8>,
    pub val_x: Vec<Vec<f64>>,
    pub val_y: Vec<u8>,
}

fn class_val_count(class_size: usize, validation_split: f64) -> usize {
    if class_size < 2 {
        // A lone sample stays in train
        return 0;
    }
    ((validation_split * class_size as f64).round() as usize)
        .max(1)
        .min(class_size - 1)
}

pub fn split_dataset(x: &[Vec<f64>], y: &[u8], validation_split: f64, seed: u64) -> DataSplit {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut pos: Vec<usize> = (0..x.len()).filter(|&i| y[i] == 1).collect();
    let mut neg: Vec<usize> = (0..x.len()).filter(|&i| y[i] == 0).collect();
    pos.shuffle(&mut rng);
    neg.shuffle(&mut rng);

    let val_pos = class_val_count(pos.len(), validation_split);
    let val_neg = class_val_count(neg.len(), validation_split);

    let mut train_idx: Vec<usize> = Vec::with_capacity(x.len());
    let mut val_idx: Vec<usize> = Vec::with_capacity(val_pos + val_neg);
    train_idx.extend(&pos[..pos.len() - val_pos]);
    train_idx.extend(&neg[..neg.len() - val_neg]);
    val_idx.extend(&pos[pos.len() - val_pos..]);
    val_idx.extend(&neg[neg.len() - val_neg..]);

    let pick = |indices: &[usize]| -> (Vec<Vec<f64>>, Vec<u8>) {
        (
            indices.iter().map(|&i| x[i].clone()).collect(),
            indices.iter().map(|&i| y[i]).collect(),
        )
    };

    let (train_x, train_y) = pick(&train_idx);
    let (val_x, val_y) = pick(&val_idx);
    DataSplit {
        train_x,
        train_y,
        val_x,
        val_y,
    }
}

// ============================================================================
// TESTS
// ============================================================================
