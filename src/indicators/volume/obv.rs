/// On-Balance Volume: running sum from 0, +volume on up closes, -volume on down closes
pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> f64 {
    closes
        .windows(2)
        .zip(volumes.iter().skip(1))
        .fold(0.0, |obv, (pair, volume)| {
            if pair[1] > pair[0] {
                obv + volume
            } else if pair[1] < pair[0] {
                obv - volume
            } else {
                obv
            }
        })
}
