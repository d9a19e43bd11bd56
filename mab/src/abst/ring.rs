use crate::{AddGrp, AddGrpOps, Mon, MonOps};

// Rings 

pub trait RingOps<T = Self>: 
    AddGrpOps<T> + 
    MonOps<T>
{}

pub trait Ring: 
    AddGrp + 
    Mon + 
    RingOps + 
    From<i32>
where
    for<'a> &'a Self: RingOps<Self>
{
    fn inv(&self) -> Option<Self>;
    fn is_unit(&self) -> bool;
    fn normalizing_unit(&self) -> Self;

    // size used for pivot selection.
    fn c_weight(&self) -> f64;

    fn is_pm_one(&self) -> bool { 
        self.is_one() || (-self).is_one()
    }
}
