/// Scale `v` to unit L2 norm in place. All-zero vectors stay zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm <= f32::EPSILON {
        return;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
}
