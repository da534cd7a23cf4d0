use crate::define_table;

define_table! {
    pub struct Order {
        #[select] ID => "id",
        #[select] AMOUNT => "amount",
        #[select] STATUS => "status",
        #[select] CREATED_AT => "createdAt",
        CUSTOMER_ID => "customerId",
    }
}

define_table! {
    pub struct Customer {
        #[select] ID => "id",
        #[select] NAME => "name",
    }
}

define_table! {
    pub struct LineItem as "line_items" {
        #[select] ORDER_ID => "orderId",
        #[select] SKU => "sku",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Bindings, Error, QueryBuilder, Result, Value,
        ast::{Expression, UnaryOp, col, lambda},
        parse,
        to_sql::RenderConfig,
        translate,
    };

    #[test]
    fn order_example() {
        let mut q = QueryBuilder::<Order>::new();
        q.filter(Order::AMOUNT.gt(100).and(Order::STATUS.eq("open")))
            .order_by([Order::CREATED_AT])
            .limit(10)
            .offset(0);
        assert_eq!(
            q.to_sql().unwrap(),
            "SELECT id,amount,status,createdAt FROM Order  WHERE ((amount>100) AND (status='open'))  ORDER BY createdAt OFFSET 0 LIMIT 10"
        );
    }

    #[test]
    fn parsed_closures_feed_the_builder() -> Result<()> {
        let bindings = Bindings::new().with("min", 100);
        let mut q = QueryBuilder::<Order>::new();
        q.filter(parse("|o| o.amount > min && o.status == 'open'", &bindings)?)
            .order_by([parse("|o| o.createdAt", &bindings)?])
            .limit(10);
        assert_eq!(
            q.to_sql()?,
            "SELECT id,amount,status,createdAt FROM Order  WHERE ((amount>100) AND (status='open'))  ORDER BY createdAt OFFSET 0 LIMIT 10"
        );
        Ok(())
    }

    #[test]
    fn repeated_filters_equal_one_conjunction() {
        let mut twice = QueryBuilder::<Order>::new();
        twice
            .filter(Order::AMOUNT.gt(1))
            .filter(Order::STATUS.ne("void"));

        let mut once = QueryBuilder::<Order>::new();
        once.filter(Order::AMOUNT.gt(1).and(Order::STATUS.ne("void")));

        assert_eq!(twice.to_sql().unwrap(), once.to_sql().unwrap());
        assert_eq!(twice.state().predicate, once.state().predicate);
    }

    #[test]
    fn filters_strip_the_closure_wrapper() {
        let mut q = QueryBuilder::<Order>::new();
        q.filter(lambda("o", Order::AMOUNT.gt(1)))
            .filter(lambda("p", Order::ID.lt(9)));
        assert_eq!(
            q.state().predicate,
            Some(Order::AMOUNT.gt(1).and(Order::ID.lt(9)))
        );
    }

    #[test]
    fn joins() {
        let mut q = QueryBuilder::<Order>::new();
        q.join(Order::CUSTOMER_ID, Customer::ID)
            .filter(Order::AMOUNT.gt(5));
        assert_eq!(
            q.to_sql().unwrap(),
            "SELECT id,amount,status,createdAt FROM Order JOIN Customer ON Order.customerId=Customer.id WHERE (amount>5)   OFFSET 0 LIMIT 0"
        );

        q.join::<LineItem>(Order::ID, col("orderId"));
        assert_eq!(
            q.to_sql().unwrap(),
            "SELECT id,amount,status,createdAt FROM Order JOIN Customer ON Order.customerId=Customer.id JOIN line_items ON Order.id=line_items.orderId WHERE (amount>5)   OFFSET 0 LIMIT 0"
        );
    }

    #[test]
    fn grouping_with_aggregates() {
        let mut q = QueryBuilder::<Order>::new();
        q.group_by([Order::STATUS])
            .sum([Order::AMOUNT])
            .count([Order::ID]);
        assert_eq!(
            q.to_sql().unwrap(),
            "SELECT status,SUM(amount) AS amount,COUNT(id) AS id FROM Order   GROUP BY status  OFFSET 0 LIMIT 0"
        );
    }

    #[test]
    fn repeated_columns_are_kept() {
        let mut q = QueryBuilder::<Order>::new();
        q.group_by([Order::STATUS, Order::STATUS])
            .sum([Order::AMOUNT, Order::AMOUNT])
            .count([Order::ID])
            .count([Order::ID])
            .order_by([Order::ID, Order::ID]);
        assert_eq!(
            q.to_sql().unwrap(),
            "SELECT status,status,SUM(amount) AS amount,SUM(amount) AS amount,COUNT(id) AS id,COUNT(id) AS id FROM Order   GROUP BY status,status ORDER BY id,id OFFSET 0 LIMIT 0"
        );
    }

    #[test]
    fn explicit_projection_is_intersected() {
        let mut q = QueryBuilder::<Order>::new();
        q.select([Order::STATUS, Order::CUSTOMER_ID, Order::ID]);
        assert_eq!(q.projections().unwrap(), vec!["status", "id"]);
        assert_eq!(
            q.to_sql().unwrap(),
            "SELECT status,id FROM Order     OFFSET 0 LIMIT 0"
        );
    }

    #[test]
    fn projection_without_overlap_selects_defaults() {
        let mut q = QueryBuilder::<Order>::new();
        q.select([Order::CUSTOMER_ID]);
        assert_eq!(
            q.projections().unwrap(),
            vec!["id", "amount", "status", "createdAt"]
        );
    }

    #[test]
    fn paging() {
        let mut q = QueryBuilder::<Customer>::new();
        q.offset(20).limit(10);
        assert_eq!(
            q.to_sql().unwrap(),
            "SELECT id,name FROM Customer     OFFSET 20 LIMIT 10"
        );
    }

    #[test]
    fn quotes_in_text_are_doubled() {
        let mut q = QueryBuilder::<Customer>::new();
        q.filter(Customer::NAME.eq("O'Brien"));
        assert!(
            q.to_sql()
                .unwrap()
                .contains("WHERE (name='O''Brien')")
        );
    }

    #[test]
    fn bind_mode_collects_params_in_order() {
        let mut q = QueryBuilder::<Order>::new();
        q.filter(Order::AMOUNT.gt(100).and(Order::STATUS.is_in(["open", "held"])))
            .limit(5);
        let stmt = q.build().unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT id,amount,status,createdAt FROM Order  WHERE ((amount>?) AND (status IN (?,?)))   OFFSET 0 LIMIT 5"
        );
        assert_eq!(
            stmt.params,
            vec![Value::Int(100), Value::from("open"), Value::from("held")]
        );
    }

    #[test]
    fn rendering_is_repeatable_and_follows_mutation() {
        let mut q = QueryBuilder::<Order>::new();
        q.filter(Order::AMOUNT.ge(3));
        let first = q.to_sql().unwrap();
        assert_eq!(q.to_sql().unwrap(), first);

        q.limit(3);
        let second = q.to_sql().unwrap();
        assert_ne!(second, first);
        assert!(second.ends_with("OFFSET 0 LIMIT 3"));
    }

    #[test]
    fn values_are_captured_when_the_tree_is_built() -> Result<()> {
        let mut bindings = Bindings::new();
        bindings.bind("limit", 10);
        let mut q = QueryBuilder::<Order>::new();
        q.filter(parse("|o| o.amount < limit", &bindings)?);

        bindings.bind("limit", 20);
        assert!(q.to_sql()?.contains("WHERE (amount<10)"));
        Ok(())
    }

    #[test]
    fn untranslatable_predicates_fail_the_render() {
        let mut q = QueryBuilder::<Order>::new();
        q.filter(Expression::Unary(
            UnaryOp::Not,
            Box::new(Order::STATUS.eq("open")),
        ));
        assert!(matches!(
            q.to_sql(),
            Err(translate::Error::UnsupportedExpression(_))
        ));

        let mut q = QueryBuilder::<Order>::new();
        q.filter(Order::ID.is_in(Vec::<i64>::new()));
        assert!(matches!(
            q.build(),
            Err(translate::Error::InvalidArgument(_))
        ));

        let mut q = QueryBuilder::<Order>::new();
        q.filter(Order::STATUS.eq(Value::Null));
        assert!(matches!(
            q.to_sql(),
            Err(translate::Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn non_finite_floats_fail_in_both_modes() {
        let mut q = QueryBuilder::<Order>::new();
        q.filter(Order::AMOUNT.gt(f64::INFINITY).or(Order::AMOUNT.eq(f64::NAN)));
        assert!(matches!(
            q.to_sql(),
            Err(translate::Error::InvalidArgument(_))
        ));
        assert!(matches!(
            q.build(),
            Err(translate::Error::InvalidArgument(_))
        ));

        let mut q = QueryBuilder::<Order>::new();
        q.filter(Order::AMOUNT.is_in([1.5, f64::NEG_INFINITY]));
        assert!(matches!(
            q.build(),
            Err(translate::Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn missing_predicate_only_when_required() {
        let q = QueryBuilder::<Customer>::new();
        assert!(q.to_sql().unwrap().contains("FROM Customer     OFFSET"));

        let config = RenderConfig {
            require_predicate: true,
            ..RenderConfig::inline()
        };
        assert_eq!(q.render(&config), Err(translate::Error::MissingPredicate));
    }

    #[test]
    fn crate_error_wraps_both_layers() {
        let err: Error = translate::Error::MissingPredicate.into();
        assert!(matches!(err, Error::Translate(_)));
        assert_eq!(err.to_string(), "no predicate was supplied");

        let err = parse("", &Bindings::new()).map_err(Error::from).unwrap_err();
        assert_eq!(err, Error::Parse(crate::parser::Error::NoExpression));
        assert_eq!(err.to_string(), "Empty input");
    }
}
