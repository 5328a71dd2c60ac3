// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::Unit;

pub const EMP_CURSOR_PKG: Unit = (
    "hr",
    "emp_cursor_pkg",
    "PACKAGE BODY emp_cursor_pkg IS\n\
     PROCEDURE raise_dept_salaries(p_dept NUMBER) IS\n\
     CURSOR c_emp IS SELECT emp_id, salary FROM hr.employees WHERE dept_id = p_dept;\n\
     v_emp_id NUMBER;\n\
     v_salary NUMBER;\n\
     BEGIN\n\
     OPEN c_emp;\n\
     LOOP\n\
     FETCH c_emp INTO v_emp_id, v_salary;\n\
     EXIT WHEN c_emp%NOTFOUND;\n\
     UPDATE hr.employees SET salary = v_salary * 1.1 WHERE emp_id = v_emp_id;\n\
     END LOOP;\n\
     CLOSE c_emp;\n\
     END raise_dept_salaries;\n\
     FUNCTION dept_headcount(p_dept NUMBER) RETURN NUMBER IS\n\
     v_count NUMBER := 0;\n\
     BEGIN\n\
     FOR r IN (SELECT emp_id FROM hr.employees WHERE dept_id = p_dept) LOOP\n\
     v_count := v_count + 1;\n\
     END LOOP;\n\
     RETURN v_count;\n\
     END dept_headcount;\n\
     END emp_cursor_pkg;",
);
