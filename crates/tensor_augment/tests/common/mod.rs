use tch::{Device, Kind, Tensor};

/// `[C, H, W]` float image where every pixel of channel `c` equals `c + 1`.
pub fn labelled_image(channels: i64, height: i64, width: i64) -> Tensor {
    (Tensor::arange(channels, (Kind::Float, Device::Cpu)) + 1.0)
        .reshape(&[channels, 1, 1])
        .expand(&[channels, height, width], false)
        .contiguous()
}

/// Flattens a tensor into a `Vec<f64>` for exact comparisons.
pub fn values(t: &Tensor) -> Vec<f64> {
    let flat = t.to_kind(Kind::Double).flatten(0, -1);
    (0..flat.size()[0]).map(|i| flat.double_value(&[i])).collect()
}
