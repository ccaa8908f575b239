//! Data-transfer shapes mirrored from the backend. None of them carry
//! behavior beyond small derived helpers and client-side validation.

pub mod consorcio;
pub mod cuenta;
pub mod customer;
pub mod gasto;
pub mod liquidacion;
pub mod pago;
pub mod persona;
pub mod proveedor;
pub mod rubro;
pub mod scope;
pub mod transaccion;
pub mod unidad;

pub use consorcio::*;
pub use cuenta::*;
pub use customer::*;
pub use gasto::*;
pub use liquidacion::*;
pub use pago::*;
pub use persona::*;
pub use proveedor::*;
pub use rubro::*;
pub use scope::*;
pub use transaccion::*;
pub use unidad::*;
