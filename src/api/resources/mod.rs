//! Resource declarations: one marker type per backend resource.

mod liquidaciones;
mod personas;

use crate::api::resource::Resource;
use crate::models::*;

/// Declare a marker type implementing [`Resource`].
///
/// # Usage
///
/// ```ignore
/// resource!(Rubros, "rubros", "/rubros", Rubro, CreateRubroInput, UpdateRubroInput, ConsorcioScope);
///
/// // Writes that move data owned by other resources name them:
/// resource!(PagosProveedores, "pagos_proveedores", "/pagos/proveedores",
///     PagoProveedor, CreatePagoProveedorInput, UpdatePagoInput, ConsorcioScope,
///     related = ["gastos", "transacciones", "cuentas"]);
/// ```
macro_rules! resource {
    (
        $(#[$meta:meta])*
        $marker:ident, $name:literal, $path:literal,
        $entity:ty, $create:ty, $update:ty, $filter:ty
        $(, related = [$($rel:literal),* $(,)?])? $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $marker;

        impl Resource for $marker {
            const NAME: &'static str = $name;
            const PATH: &'static str = $path;
            type Entity = $entity;
            type Create = $create;
            type Update = $update;
            type Filter = $filter;

            $(
                fn related() -> &'static [&'static str] {
                    &[$($rel),*]
                }
            )?
        }
    };
}

resource!(
    /// Administration clients. The only resource without a consorcio scope.
    Customers, "customers", "/customers",
    Customer, CreateCustomerInput, UpdateCustomerInput, Unscoped
);
resource!(
    Consorcios, "consorcios", "/consorcios",
    Consorcio, CreateConsorcioInput, UpdateConsorcioInput, ConsorcioFilter
);
resource!(
    Cuentas, "cuentas", "/cuentas",
    Cuenta, CreateCuentaInput, UpdateCuentaInput, ConsorcioScope
);
resource!(
    Personas, "personas", "/personas",
    Persona, CreatePersonaInput, UpdatePersonaInput, ConsorcioScope
);
resource!(
    Proveedores, "proveedores", "/proveedores",
    Proveedor, CreateProveedorInput, UpdateProveedorInput, ConsorcioScope
);
resource!(
    Rubros, "rubros", "/rubros",
    Rubro, CreateRubroInput, UpdateRubroInput, ConsorcioScope
);
resource!(
    Unidades, "unidades", "/unidades",
    Unidad, CreateUnidadInput, UpdateUnidadInput, ConsorcioScope
);
resource!(
    Gastos, "gastos", "/gastos",
    Gasto, CreateGastoInput, UpdateGastoInput, GastoFilter
);
resource!(
    Liquidaciones, "liquidaciones", "/liquidaciones",
    Liquidacion, CreateLiquidacionInput, UpdateLiquidacionInput, ConsorcioScope
);
resource!(
    /// Payments to suppliers settle gastos and move money out of a cuenta.
    PagosProveedores, "pagos_proveedores", "/pagos/proveedores",
    PagoProveedor, CreatePagoProveedorInput, UpdatePagoInput, ConsorcioScope,
    related = ["gastos", "transacciones", "cuentas"]
);
resource!(
    /// Payments of expensas settle a unit's debt on a liquidacion.
    PagosExpensas, "pagos_expensas", "/pagos/expensas",
    PagoLiquidacionUnidad, CreatePagoLiquidacionUnidadInput, UpdatePagoInput, ConsorcioScope,
    related = ["liquidaciones", "transacciones", "cuentas"]
);
resource!(
    /// Account movements. Filter by consorcio or by a single cuenta.
    Transacciones, "transacciones", "/transacciones",
    Transaccion, CreateTransaccionInput, UpdateTransaccionInput, TransaccionFilter,
    related = ["cuentas"]
);

impl TransaccionFilter {
    pub fn por_cuenta(cuenta_id: i64) -> Self {
        Self {
            consorcio_id: None,
            cuenta_id: Some(cuenta_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resource::{detail_key, list_key, lists_key, write_invalidations};
    use crate::query::QueryKey;

    #[test]
    fn keys_follow_name_list_detail_layout() {
        let scope = ConsorcioScope::new(5);
        assert_eq!(list_key::<Rubros>(&scope).to_string(), r#"["rubros","list",{consorcio_id:5}]"#);
        assert_eq!(detail_key::<Rubros>(42).to_string(), r#"["rubros","detail",42]"#);
        assert!(list_key::<Rubros>(&scope).starts_with(&lists_key::<Rubros>()));
        assert!(!list_key::<Rubros>(&scope).starts_with(&lists_key::<Proveedores>()));
    }

    #[test]
    fn payments_invalidate_related_roots() {
        let keys = write_invalidations::<PagosExpensas>(Some(7));
        assert_eq!(keys[0], lists_key::<PagosExpensas>());
        assert_eq!(keys[1], detail_key::<PagosExpensas>(7));
        assert!(keys.contains(&QueryKey::new("liquidaciones")));
        assert!(keys.contains(&QueryKey::new("cuentas")));
        assert!(write_invalidations::<Rubros>(None).len() == 1);
    }

    #[test]
    fn transacciones_can_be_scoped_by_cuenta_alone() {
        use crate::models::Scope;
        let filter = TransaccionFilter::por_cuenta(3);
        assert!(filter.is_ready());
        assert_eq!(
            list_key::<Transacciones>(&filter).to_string(),
            r#"["transacciones","list",{cuenta_id:3}]"#
        );
    }
}
